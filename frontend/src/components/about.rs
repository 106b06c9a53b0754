use yew::prelude::*;

struct PerformanceStat {
    name: &'static str,
    value: &'static str,
    emoji: &'static str,
    samples: &'static str,
    color: &'static str,
}

struct DatasetInfo {
    name: &'static str,
    source: &'static str,
    samples: &'static str,
    purpose: &'static str,
}

const PERFORMANCE: [PerformanceStat; 3] = [
    PerformanceStat {
        name: "Pneumonia Detection",
        value: "99.62%",
        emoji: "🫁",
        samples: "3,166 balanced images",
        color: "#1f77b4",
    },
    PerformanceStat {
        name: "Tuberculosis Detection",
        value: "99.93%",
        emoji: "🧬",
        samples: "1,400 balanced images",
        color: "#2ca02c",
    },
    PerformanceStat {
        name: "Fibrosis Detection",
        value: "99.31%",
        emoji: "🌫️",
        samples: "1,454 balanced images",
        color: "#9467bd",
    },
];

const DATASETS: [DatasetInfo; 4] = [
    DatasetInfo {
        name: "Lung Disease Dataset (4 Types)",
        source: "Kaggle (omkarmanohardalvi)",
        samples: "6,423 images",
        purpose: "General disease classification",
    },
    DatasetInfo {
        name: "Chest X-ray Pneumonia",
        source: "Kaggle (paultimothymooney)",
        samples: "5,863 images",
        purpose: "Pneumonia detection",
    },
    DatasetInfo {
        name: "TB Chest X-ray Dataset",
        source: "Kaggle (tawsifurrahman)",
        samples: "3,500 images",
        purpose: "Tuberculosis detection",
    },
    DatasetInfo {
        name: "Pulmonary Fibrosis",
        source: "Kaggle (aryashetty29)",
        samples: "1,454 images",
        purpose: "Fibrosis detection",
    },
];

const SPECS: [(&str, &str, &str); 4] = [
    ("💻", "Base Architecture", "DenseNet121"),
    ("🧪", "Framework", "PyTorch"),
    ("🖼️", "Input Size", "224×224px"),
    ("⏱️", "Training Time", "30 epochs"),
];

const PREPROCESSING: [&str; 5] = [
    "Image resizing to 224×224",
    "Normalization (μ=[0.485, 0.456, 0.406], σ=[0.229, 0.224, 0.225])",
    "Data augmentation (rotation, flipping, color jitter)",
    "Class balancing (undersampling majority classes)",
    "Train/Val split (80/20)",
];

const CLINICAL_IMPACT: [(&str, &str, &str); 3] = [
    ("🏥", "Early Detection", "Identifies diseases at stages when treatment is most effective"),
    ("🛡️", "Reduced Workload", "Helps radiologists prioritize urgent cases"),
    ("📱", "Accessibility", "Potential for deployment in resource-limited settings"),
];

const FUTURE_DIRECTIONS: [&str; 4] = [
    "Expand to additional pulmonary conditions",
    "Incorporate 3D CT scan analysis",
    "Develop mobile application for field use",
    "Obtain regulatory approvals",
];

pub fn render_about() -> Html {
    html! {
        <main class="main-content about">
            <div class="about-box">
                <h1>{"About RespiraScan"}</h1>
                <p>{"AI-powered diagnostic assistant for detecting lung diseases from chest X-rays"}</p>
            </div>

            <h2 class="section-title">{"🧠 Model Performance"}</h2>
            <div class="card-row">
                { for PERFORMANCE.iter().map(|stat| html! {
                    <div class="card">
                        <div class="card-icon" style={format!("color: {};", stat.color)}>{ stat.emoji }</div>
                        <div class="card-value">{ stat.value }</div>
                        <div class="card-title">{ stat.name }</div>
                        <div class="card-desc">{ stat.samples }</div>
                    </div>
                })}
            </div>

            <hr class="custom-hr" />
            <h2 class="section-title">{"Datasets Used"}</h2>
            <div class="card-row">
                { for DATASETS.iter().map(|data| html! {
                    <div class="card">
                        <div class="card-title">{ data.name }</div>
                        <div class="card-desc">{"Source: "}<i>{ data.source }</i></div>
                        <div class="card-desc">{ format!("Samples: {}", data.samples) }</div>
                        <div class="card-desc">{ format!("Used for: {}", data.purpose) }</div>
                    </div>
                })}
            </div>

            <hr class="custom-hr" />
            <h2 class="section-title">{"Model Architecture"}</h2>
            <div class="two-columns">
                <div>
                    <h3>{"🧪 Technical Specifications"}</h3>
                    <div class="card-row">
                        { for SPECS.iter().map(|(icon, title, value)| html! {
                            <div class="card card-inline">
                                <div class="card-icon">{ *icon }</div>
                                <div>
                                    <div class="card-title">{ *title }</div>
                                    <div class="card-value">{ *value }</div>
                                </div>
                            </div>
                        })}
                    </div>
                </div>
                <div>
                    <h3>{"⚖️ Preprocessing Steps"}</h3>
                    <ul>
                        { for PREPROCESSING.iter().map(|step| html! { <li>{ *step }</li> }) }
                    </ul>
                </div>
            </div>

            <hr class="custom-hr" />
            <h2 class="section-title">{"Clinical Impact"}</h2>
            <div class="card-row">
                { for CLINICAL_IMPACT.iter().map(|(icon, title, desc)| html! {
                    <div class="card">
                        <div class="card-icon">{ *icon }</div>
                        <div class="card-title">{ *title }</div>
                        <div class="card-desc">{ *desc }</div>
                    </div>
                })}
            </div>

            <hr class="custom-hr" />
            <h2 class="section-title">{"Future Directions"}</h2>
            <div class="card-row">
                { for FUTURE_DIRECTIONS.iter().map(|item| html! {
                    <div class="card"><div class="card-desc">{ *item }</div></div>
                })}
            </div>

            <hr class="custom-hr" />
            <footer class="app-footer">
                <p>{"© 2025 RespiraScan. Developed with Rust, PyTorch and Grad-CAM."}</p>
            </footer>
        </main>
    }
}
