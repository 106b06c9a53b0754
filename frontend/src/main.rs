mod api;
mod components;

use components::about::render_about;
use components::handlers;
use components::header::render_header;
use components::results::render_results;
use components::sidebar::render_sidebar;
use components::upload_section::render_upload_section;
use components::utils::render_error_message;
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::AnalysisResponse;
use web_sys::DragEvent;
use yew::prelude::*;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Page {
    Home,
    About,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::Home, Page::About];

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::About => "About",
        }
    }
}

pub struct Upload {
    pub file: GlooFile,
    pub preview_url: ObjectUrl,
}

pub enum Msg {
    SelectPage(Page),
    FileSelected(GlooFile),
    AnalysisDone(u64, AnalysisResponse),
    AnalysisFailed(u64, String),
    RejectFile(String),
    SetDragging(bool),
    HandleDrop(DragEvent),
}

pub struct App {
    pub page: Page,
    pub upload: Option<Upload>,
    pub result: Option<AnalysisResponse>,
    pub loading: bool,
    pub error: Option<String>,
    pub is_dragging: bool,
    /// Bumped on every new upload so replies for a replaced file are ignored.
    pub generation: u64,
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            page: Page::Home,
            upload: None,
            result: None,
            loading: false,
            error: None,
            is_dragging: false,
            generation: 0,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SelectPage(page) => {
                let changed = self.page != page;
                self.page = page;
                changed
            }
            Msg::FileSelected(file) => handlers::handle_file_selected(self, ctx, file),
            Msg::AnalysisDone(generation, response) => {
                handlers::handle_analysis_done(self, generation, response)
            }
            Msg::AnalysisFailed(generation, message) => {
                handlers::handle_analysis_failed(self, generation, message)
            }
            Msg::RejectFile(message) => handlers::handle_rejected_file(self, message),
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="layout">
                { render_sidebar(self, ctx) }
                <div class="container">
                    {
                        match self.page {
                            Page::Home => html! {
                                <main class="main-content">
                                    { render_header() }
                                    <hr class="custom-hr" />
                                    { render_upload_section(self, ctx) }
                                    { render_error_message(self) }
                                    { render_results(self) }
                                    <hr class="custom-hr" />
                                    <footer class="app-footer">
                                        <p>{"Built with Rust, actix-web & yew"}</p>
                                    </footer>
                                </main>
                            },
                            Page::About => render_about(),
                        }
                    }
                </div>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("RespiraScan starting...");
    yew::Renderer::<App>::new().render();
}
