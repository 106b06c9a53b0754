use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumIter, EnumString};

mod api;

pub use api::{AnalysisResponse, ErrorResponse, Finding, HealthResponse, Heatmap};

/// Conditions the classifier has a head for, in model output order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum Disease {
    Pneumonia,
    Tuberculosis,
    Fibrosis,
}

impl Disease {
    pub const ALL: [Disease; 3] = [Disease::Pneumonia, Disease::Tuberculosis, Disease::Fibrosis];

    /// Position of this disease in the model's output vector.
    pub fn index(self) -> usize {
        match self {
            Disease::Pneumonia => 0,
            Disease::Tuberculosis => 1,
            Disease::Fibrosis => 2,
        }
    }
}

/// Order in which the heatmap panel shows its overlays.
pub const HEATMAP_ORDER: [Disease; 3] = Disease::ALL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Disease,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPrediction")]
pub struct Prediction {
    pub label: Label,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("confidence {0} is outside [0, 1]")]
pub struct InvalidConfidence(pub String);

#[derive(Deserialize)]
struct RawPrediction {
    label: Label,
    confidence: f32,
}

impl TryFrom<RawPrediction> for Prediction {
    type Error = InvalidConfidence;

    fn try_from(raw: RawPrediction) -> Result<Self, Self::Error> {
        Prediction::new(raw.label, raw.confidence)
    }
}

impl Prediction {
    pub fn new(label: Label, confidence: f32) -> Result<Self, InvalidConfidence> {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(InvalidConfidence(confidence.to_string()));
        }
        Ok(Self { label, confidence })
    }

    pub fn is_disease(&self) -> bool {
        self.label == Label::Disease
    }
}

pub type Predictions = BTreeMap<Disease, Prediction>;

/// Picks the disease-labelled entry with the highest confidence.
///
/// Entries labelled `Normal` never qualify, so `None` means no abnormality was
/// detected. Ties go to the disease that comes first in output order.
pub fn highest_confidence(predictions: &Predictions) -> Option<Finding> {
    let mut best: Option<Finding> = None;
    for (disease, prediction) in predictions.iter().filter(|(_, p)| p.is_disease()) {
        let better = best
            .as_ref()
            .is_none_or(|current| prediction.confidence > current.confidence);
        if better {
            best = Some(Finding {
                disease: *disease,
                confidence: prediction.confidence,
            });
        }
    }
    best
}

/// Formats a `[0, 1]` confidence as a percentage with one decimal.
pub fn format_percent(confidence: f32) -> String {
    format!("{:.1}%", confidence * 100.0)
}
