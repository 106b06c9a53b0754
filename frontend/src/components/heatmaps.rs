use shared::{AnalysisResponse, HEATMAP_ORDER};
use yew::prelude::*;

/// Three overlays, always in heatmap order, whatever order the server sent.
pub fn render_heatmaps(result: &AnalysisResponse) -> Html {
    html! {
        <div class="heatmaps">
            <h3>{"Heatmap Visualizations"}</h3>
            <div class="heatmap-row">
                { for HEATMAP_ORDER.iter().map(|disease| {
                    let caption = format!("{} Heatmap", disease);
                    match result.heatmap(*disease) {
                        Some(heatmap) => html! {
                            <figure class="heatmap">
                                <img src={heatmap.image.clone()} alt={caption.clone()} />
                                <figcaption>{ caption }</figcaption>
                            </figure>
                        },
                        None => html! {
                            <figure class="heatmap heatmap-missing">
                                <p>{"Heatmap unavailable"}</p>
                                <figcaption>{ caption }</figcaption>
                            </figure>
                        },
                    }
                })}
            </div>
        </div>
    }
}
