use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::imageops::{self, FilterType};
use image::{GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use ndarray::{Array1, Array2, Axis};
use std::io::Cursor;

use super::{FeatureGradients, InferenceError};

/// Computes a Grad-CAM map normalised to `[0, 1]`, shaped `(height, width)` of
/// the feature maps.
///
/// Channel weights are the spatial mean of the gradients; the weighted sum of the
/// activations goes through a ReLU and is min-max scaled. A flat map scales to zero.
pub fn class_activation_map(features: &FeatureGradients) -> Result<Array2<f32>, InferenceError> {
    let FeatureGradients {
        activations,
        gradients,
    } = features;
    if activations.shape() != gradients.shape() {
        return Err(InferenceError::Model(format!(
            "activation shape {:?} does not match gradient shape {:?}",
            activations.shape(),
            gradients.shape()
        )));
    }

    let (_, height, width) = activations.dim();
    let weights: Array1<f32> = gradients
        .mean_axis(Axis(2))
        .and_then(|per_row| per_row.mean_axis(Axis(1)))
        .ok_or_else(|| InferenceError::Model("empty feature maps".to_string()))?;

    let mut cam = Array2::<f32>::zeros((height, width));
    for (weight, channel) in weights.iter().zip(activations.outer_iter()) {
        cam.scaled_add(*weight, &channel);
    }
    cam.mapv_inplace(|v| if v.is_finite() { v.max(0.0) } else { 0.0 });

    let max = cam.iter().copied().fold(f32::MIN, f32::max);
    let min = cam.iter().copied().fold(f32::MAX, f32::min);
    let range = max - min;
    if range > 1e-8 {
        cam.mapv_inplace(|v| (v - min) / range);
    } else {
        cam.fill(0.0);
    }
    Ok(cam)
}

/// Maps `[0, 255]` intensity onto the jet colour scale (blue, cyan, yellow, red).
pub fn jet(intensity: u8) -> Rgb<u8> {
    let v = intensity as f32 / 255.0;
    let channel = |offset: f32| {
        let c = (1.5 - (4.0 * v - offset).abs()).clamp(0.0, 1.0);
        (c * 255.0).round() as u8
    };
    Rgb([channel(3.0), channel(2.0), channel(1.0)])
}

/// Upsamples `cam` to the image size, colours it and blends it over `image`.
///
/// `alpha` is the weight of the heat colour; the result has the same
/// dimensions as `image`.
pub fn overlay(image: &RgbImage, cam: &Array2<f32>, alpha: f32) -> Result<RgbImage, InferenceError> {
    let (cam_height, cam_width) = cam.dim();
    if cam_height == 0 || cam_width == 0 {
        return Err(InferenceError::Model("empty activation map".to_string()));
    }

    let small = GrayImage::from_fn(cam_width as u32, cam_height as u32, |x, y| {
        let v = cam[[y as usize, x as usize]].clamp(0.0, 1.0);
        Luma([(v * 255.0).round() as u8])
    });
    let (width, height) = image.dimensions();
    let heat = imageops::resize(&small, width, height, FilterType::Triangle);

    let blended = RgbImage::from_fn(width, height, |x, y| {
        let base = image.get_pixel(x, y);
        let color = jet(heat.get_pixel(x, y)[0]);
        let mix = |c: usize| {
            (alpha * color[c] as f32 + (1.0 - alpha) * base[c] as f32)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb([mix(0), mix(1), mix(2)])
    });
    Ok(blended)
}

/// PNG-encodes an overlay as a `data:` URL the browser can show directly.
pub fn to_data_url(image: &RgbImage) -> Result<String, InferenceError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| InferenceError::Encode(e.to_string()))?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&bytes)))
}
