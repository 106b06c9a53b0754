pub mod gradcam;
pub mod preprocess;
#[cfg(feature = "libtorch")]
pub mod torch;

use image::RgbImage;
use ndarray::{Array3, Array4};
use shared::{Disease, HEATMAP_ORDER, Label, Prediction, Predictions};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{GradCamConfig, ModelConfig};

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),
    #[error("Failed to load model from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },
    #[error("No inference backend compiled in; rebuild with `--features libtorch`")]
    BackendUnavailable,
    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Unsupported image format, expected JPEG or PNG")]
    UnsupportedFormat,
    #[error("Image is larger than {max_side}x{max_side} pixels")]
    ImageTooLarge { max_side: u32 },
    #[error("Preprocessing failed: {0}")]
    Preprocessing(String),
    #[error("Model returned {got} outputs, expected {expected}")]
    OutputShape { expected: usize, got: usize },
    #[error("Model error: {0}")]
    Model(String),
    #[error("Failed to encode heatmap: {0}")]
    Encode(String),
    #[cfg(feature = "libtorch")]
    #[error("Torch error: {0}")]
    Torch(#[from] tch::TchError),
}

impl InferenceError {
    /// Whether the failure was caused by the uploaded bytes rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            InferenceError::Decode(_)
                | InferenceError::UnsupportedFormat
                | InferenceError::ImageTooLarge { .. }
        )
    }
}

/// Last convolutional feature maps and the gradients of one class score with
/// respect to them, both shaped `(channels, height, width)`.
#[derive(Debug, Clone)]
pub struct FeatureGradients {
    pub activations: Array3<f32>,
    pub gradients: Array3<f32>,
}

/// A loaded classifier with one output per [`Disease`], in output order.
pub trait DiagnosticModel: Send + Sync {
    /// Raw scores for a normalised `(1, 3, size, size)` input.
    fn logits(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError>;

    fn feature_gradients(
        &self,
        input: &Array4<f32>,
        class_index: usize,
    ) -> Result<FeatureGradients, InferenceError>;

    fn device(&self) -> String;
}

pub type ModelHandle = Arc<dyn DiagnosticModel>;

pub fn load_model(path: &Path) -> Result<ModelHandle, InferenceError> {
    if !path.exists() {
        return Err(InferenceError::ModelNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(InferenceError::ModelLoad {
            path: path.to_path_buf(),
            reason: "not a regular file".to_string(),
        });
    }

    #[cfg(feature = "libtorch")]
    {
        let model = torch::TorchModel::load(path)?;
        log::info!("Loaded TorchScript model from {}", path.display());
        Ok(Arc::new(model))
    }

    #[cfg(not(feature = "libtorch"))]
    {
        Err(InferenceError::BackendUnavailable)
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Turns one logit per disease into labelled predictions.
///
/// `confidence` is the probability of the reported label, so a `Normal` entry at
/// 0.9 means the model gives the disease a 10% chance.
pub fn predictions_from_logits(
    logits: &[f32],
    threshold: f32,
) -> Result<Predictions, InferenceError> {
    if logits.len() != Disease::ALL.len() {
        return Err(InferenceError::OutputShape {
            expected: Disease::ALL.len(),
            got: logits.len(),
        });
    }

    let mut predictions = Predictions::new();
    for disease in Disease::ALL {
        let probability = sigmoid(logits[disease.index()]);
        let (label, confidence) = if probability >= threshold {
            (Label::Disease, probability)
        } else {
            (Label::Normal, 1.0 - probability)
        };
        let prediction = Prediction::new(label, confidence)
            .map_err(|e| InferenceError::Model(format!("{} score: {}", disease, e)))?;
        predictions.insert(disease, prediction);
    }
    Ok(predictions)
}

pub fn predict_image(
    image: &RgbImage,
    model: &dyn DiagnosticModel,
    config: &ModelConfig,
) -> Result<Predictions, InferenceError> {
    let input = preprocess::to_input_tensor(image, config)?;
    let logits = model.logits(&input)?;
    predictions_from_logits(&logits, config.threshold)
}

/// Grad-CAM overlays for every heatmap disease, each the size of `image`.
pub fn apply_gradcam(
    image: &RgbImage,
    model: &dyn DiagnosticModel,
    model_config: &ModelConfig,
    gradcam_config: &GradCamConfig,
) -> Result<BTreeMap<Disease, RgbImage>, InferenceError> {
    let input = preprocess::to_input_tensor(image, model_config)?;

    let mut overlays = BTreeMap::new();
    for disease in HEATMAP_ORDER {
        let features = model.feature_gradients(&input, disease.index())?;
        let cam = gradcam::class_activation_map(&features)?;
        let overlay = gradcam::overlay(image, &cam, gradcam_config.alpha)?;
        overlays.insert(disease, overlay);
    }
    Ok(overlays)
}


#[cfg(test)]
mod tests {
    use super::testing::StubModel;
    use super::*;

    fn xray(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            let v = ((x + y) % 256) as u8;
            image::Rgb([v, v, v])
        })
    }

    #[test]
    fn logits_map_to_labels_in_disease_order() {
        let predictions = predictions_from_logits(&[2.0, -3.0, 0.0], 0.5).unwrap();
        let keys: Vec<Disease> = predictions.keys().copied().collect();
        assert_eq!(keys, Disease::ALL.to_vec());

        let pneumonia = predictions[&Disease::Pneumonia];
        assert_eq!(pneumonia.label, Label::Disease);
        assert!((pneumonia.confidence - sigmoid(2.0)).abs() < 1e-6);

        let tb = predictions[&Disease::Tuberculosis];
        assert_eq!(tb.label, Label::Normal);
        assert!((tb.confidence - (1.0 - sigmoid(-3.0))).abs() < 1e-6);

        // sigmoid(0) sits exactly on the threshold
        assert_eq!(predictions[&Disease::Fibrosis].label, Label::Disease);
    }

    #[test]
    fn confidences_stay_in_unit_interval() {
        let predictions = predictions_from_logits(&[80.0, -80.0, 1e-3], 0.5).unwrap();
        for prediction in predictions.values() {
            assert!((0.0..=1.0).contains(&prediction.confidence));
        }
    }

    #[test]
    fn wrong_output_count_is_a_model_error() {
        let err = predictions_from_logits(&[0.1, 0.2], 0.5).unwrap_err();
        assert!(matches!(err, InferenceError::OutputShape { expected: 3, got: 2 }));
        assert!(!err.is_client_error());
    }

    #[test]
    fn non_finite_logit_is_rejected() {
        let err = predictions_from_logits(&[f32::NAN, 0.0, 0.0], 0.5).unwrap_err();
        assert!(matches!(err, InferenceError::Model(_)));
    }

    #[test]
    fn predict_image_is_deterministic() {
        let model = StubModel::new(&[1.5, -0.5, 0.25]);
        let image = xray(64, 48);
        let config = ModelConfig::default();
        let first = predict_image(&image, &model, &config).unwrap();
        let second = predict_image(&image, &model, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn gradcam_returns_three_aligned_overlays() {
        let model = StubModel::new(&[0.0, 0.0, 0.0]);
        let image = xray(90, 60);
        let overlays = apply_gradcam(
            &image,
            &model,
            &ModelConfig::default(),
            &GradCamConfig::default(),
        )
        .unwrap();

        let keys: Vec<Disease> = overlays.keys().copied().collect();
        assert_eq!(keys, HEATMAP_ORDER.to_vec());
        for overlay in overlays.values() {
            assert_eq!(overlay.dimensions(), image.dimensions());
        }
        assert_ne!(
            overlays[&Disease::Pneumonia],
            overlays[&Disease::Fibrosis]
        );
    }

    #[test]
    fn load_model_reports_missing_file() {
        let err = load_model(Path::new("/nonexistent/final_lung_disease_model.pt"))
            .err()
            .unwrap();
        assert!(matches!(err, InferenceError::ModelNotFound(_)));
        assert!(err.to_string().contains("final_lung_disease_model.pt"));
    }

    #[test]
    fn load_model_rejects_directories() {
        let err = load_model(&std::env::temp_dir()).err().unwrap();
        assert!(matches!(err, InferenceError::ModelLoad { .. }));
    }
}
