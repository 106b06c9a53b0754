use super::super::{App, Msg, Page};
use web_sys::HtmlSelectElement;
use yew::prelude::*;

pub fn render_sidebar(app: &App, ctx: &Context<App>) -> Html {
    let on_change = ctx.link().callback(|e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        match select.value().as_str() {
            "About" => Msg::SelectPage(Page::About),
            _ => Msg::SelectPage(Page::Home),
        }
    });

    html! {
        <aside class="sidebar">
            <h2>{"🧭 Navigation"}</h2>
            <select class="page-select" onchange={on_change}>
                { for Page::ALL.iter().map(|page| html! {
                    <option value={page.title()} selected={*page == app.page}>{ page.title() }</option>
                })}
            </select>
            <hr class="custom-hr" />
            <div class="brand">{"🫁 RespiraScan"}</div>
            <p class="sidebar-blurb">
                {"AI-powered diagnostic assistant for detecting lung diseases from chest X-rays"}
            </p>
            <p class="sidebar-blurb">{"© 2025 RespiraScan. Developed with Rust, PyTorch and Grad-CAM."}</p>
        </aside>
    }
}
