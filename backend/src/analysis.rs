use chrono::Utc;
use shared::{AnalysisResponse, HEATMAP_ORDER, Heatmap, highest_confidence};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::inference::{self, DiagnosticModel, InferenceError, gradcam, preprocess};

/// Runs the full per-upload pipeline: decode, classify, Grad-CAM, encode.
pub fn analyze(
    request_id: Uuid,
    image_bytes: &[u8],
    model: &dyn DiagnosticModel,
    config: &AppConfig,
) -> Result<AnalysisResponse, InferenceError> {
    let image = preprocess::decode_image(image_bytes, config.server.max_image_side)?;
    let (width, height) = image.dimensions();
    log::info!("[{}] decoded {}x{} image", request_id, width, height);

    let predictions = inference::predict_image(&image, model, &config.model)?;
    let mut overlays = inference::apply_gradcam(&image, model, &config.model, &config.gradcam)?;

    let mut heatmaps = Vec::with_capacity(HEATMAP_ORDER.len());
    for disease in HEATMAP_ORDER {
        if !predictions.contains_key(&disease) {
            return Err(InferenceError::Model(format!("no prediction for {}", disease)));
        }
        let overlay = overlays
            .remove(&disease)
            .ok_or_else(|| InferenceError::Model(format!("no heatmap for {}", disease)))?;
        heatmaps.push(Heatmap {
            disease,
            width: overlay.width(),
            height: overlay.height(),
            image: gradcam::to_data_url(&overlay)?,
        });
    }

    let highest = highest_confidence(&predictions);
    match &highest {
        Some(finding) => log::info!(
            "[{}] highest confidence: {} ({:.3})",
            request_id,
            finding.disease,
            finding.confidence
        ),
        None => log::info!("[{}] no abnormalities detected", request_id),
    }

    Ok(AnalysisResponse {
        id: request_id.to_string(),
        analyzed_at: Utc::now().to_rfc3339(),
        width,
        height,
        predictions,
        highest_confidence: highest,
        heatmaps,
        cached: false,
    })
}
