use serde::{Deserialize, Serialize};

use crate::{Disease, Predictions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub disease: Disease,
    pub confidence: f32,
}

/// A Grad-CAM overlay, PNG encoded as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    pub disease: Disease,
    pub width: u32,
    pub height: u32,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub id: String,
    pub analyzed_at: String,
    pub width: u32,
    pub height: u32,
    pub predictions: Predictions,
    pub highest_confidence: Option<Finding>,
    pub heatmaps: Vec<Heatmap>,
    #[serde(default)]
    pub cached: bool,
}

impl AnalysisResponse {
    pub fn heatmap(&self, disease: Disease) -> Option<&Heatmap> {
        self.heatmaps.iter().find(|h| h.disease == disease)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub device: String,
    pub cached_results: usize,
}
