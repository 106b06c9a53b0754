use super::super::App;
use super::heatmaps::render_heatmaps;
use shared::{AnalysisResponse, Finding, Prediction, format_percent};
use yew::prelude::*;

pub fn banner_text(finding: Option<&Finding>) -> String {
    match finding {
        Some(finding) => format!(
            "🚨 Highest Confidence: {} ({})",
            finding.disease,
            format_percent(finding.confidence)
        ),
        None => "✅ No abnormalities detected".to_string(),
    }
}

pub fn metric_marker(prediction: &Prediction) -> &'static str {
    if prediction.is_disease() { "⚠️" } else { "✅" }
}

pub fn render_results(app: &App) -> Html {
    let Some(upload) = &app.upload else {
        return html! {
            <div class="info-message">
                <p>{"ℹ️ Please upload a chest X-ray image to get started."}</p>
            </div>
        };
    };

    html! {
        <>
            <div class="results-grid">
                <div class="input-column">
                    <h3>{"Input Image"}</h3>
                    <img class="input-image" src={upload.preview_url.to_string()} alt={upload.file.name()} />
                </div>
                <div class="diagnosis-column">
                    <h3>{"Diagnosis Results"}</h3>
                    {
                        if app.loading {
                            html! { <div class="spinner" aria-label="Analysing"></div> }
                        } else if let Some(result) = &app.result {
                            render_diagnosis(result)
                        } else {
                            html! {}
                        }
                    }
                </div>
            </div>
            {
                match (&app.result, app.loading) {
                    (Some(result), false) => html! {
                        <>
                            <hr class="custom-hr" />
                            { render_heatmaps(result) }
                        </>
                    },
                    _ => html! {},
                }
            }
        </>
    }
}

fn render_diagnosis(result: &AnalysisResponse) -> Html {
    let finding = result.highest_confidence.as_ref();
    html! {
        <>
            <div class={classes!("banner", if finding.is_some() { "banner-warning" } else { "banner-success" })}>
                { banner_text(finding) }
            </div>
            { for result.predictions.iter().map(|(disease, prediction)| {
                let percent = format_percent(prediction.confidence);
                html! {
                    <div class="metric" title={format!("Confidence: {}", percent)}>
                        <div class="metric-label">{ format!("{} {}", metric_marker(prediction), disease) }</div>
                        <div class="metric-value">{ percent }</div>
                    </div>
                }
            })}
            {
                if result.cached {
                    html! { <p class="cached-note">{"Result reused from an identical earlier upload."}</p> }
                } else {
                    html! {}
                }
            }
        </>
    }
}
