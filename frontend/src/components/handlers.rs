use super::super::{App, Msg, Upload};
use super::utils::first_image_file;
use crate::api;
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::AnalysisResponse;
use wasm_bindgen_futures::spawn_local;
use web_sys::DragEvent;
use yew::prelude::*;

/// A new upload replaces the previous one and is analysed right away.
pub fn handle_file_selected(app: &mut App, ctx: &Context<App>, file: GlooFile) -> bool {
    app.generation += 1;
    app.error = None;
    app.result = None;
    app.loading = true;
    app.upload = Some(Upload {
        preview_url: ObjectUrl::from(file.clone()),
        file: file.clone(),
    });

    log::info!("Analysing {} ({} bytes)", file.name(), file.size());
    send_analysis_request(ctx, app.generation, file);
    true
}

pub fn handle_analysis_done(app: &mut App, generation: u64, response: AnalysisResponse) -> bool {
    if generation != app.generation {
        return false;
    }
    app.loading = false;
    app.result = Some(response);
    true
}

pub fn handle_analysis_failed(app: &mut App, generation: u64, message: String) -> bool {
    if generation != app.generation {
        return false;
    }
    log::error!("Analysis failed: {}", message);
    app.loading = false;
    app.result = None;
    app.error = Some(message);
    true
}

/// An unsupported pick supersedes any analysis still in flight.
pub fn handle_rejected_file(app: &mut App, message: String) -> bool {
    app.generation += 1;
    app.loading = false;
    app.result = None;
    app.error = Some(message);
    true
}

pub fn handle_drop(app: &mut App, ctx: &Context<App>, event: DragEvent) -> bool {
    event.prevent_default();
    app.is_dragging = false;

    let file = event
        .data_transfer()
        .and_then(|data_transfer| data_transfer.files())
        .as_ref()
        .and_then(first_image_file);

    match file {
        Some(file) => handle_file_selected(app, ctx, file),
        None => {
            log::warn!("Dropped item is not a JPG or PNG image");
            handle_rejected_file(app, "Please drop a JPG or PNG image.".into())
        }
    }
}

fn send_analysis_request(ctx: &Context<App>, generation: u64, file: GlooFile) {
    let link = ctx.link().clone();
    spawn_local(async move {
        match api::analyze_image(&file).await {
            Ok(response) => link.send_message(Msg::AnalysisDone(generation, response)),
            Err(message) => link.send_message(Msg::AnalysisFailed(generation, message)),
        }
    });
}
