use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1>{"🫁 RespiraScan"}</h1>
            <p class="subtitle">{"Early Detection, Healthier Lungs"}</p>
            <p class="tagline">
                {"Detect Pneumonia, Tuberculosis, and Pulmonary Fibrosis effortlessly using AI-driven analysis of Chest X-rays."}
            </p>
        </header>
    }
}
