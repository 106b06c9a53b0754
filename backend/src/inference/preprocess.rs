use image::imageops::{self, FilterType};
use image::{ImageError, ImageFormat, ImageReader, Limits, RgbImage};
use ndarray::Array4;
use std::io::Cursor;

use super::InferenceError;
use crate::config::ModelConfig;

/// Decodes JPEG or PNG bytes into an 8-bit RGB bitmap.
///
/// The format is sniffed from the bytes; the client-supplied file name is not trusted.
/// Images wider or taller than `max_side` pixels are rejected from their header,
/// before any pixel data is allocated.
pub fn decode_image(bytes: &[u8], max_side: u32) -> Result<RgbImage, InferenceError> {
    let format = image::guess_format(bytes).map_err(|_| InferenceError::UnsupportedFormat)?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        return Err(InferenceError::UnsupportedFormat);
    }

    let mut limits = Limits::default();
    limits.max_image_width = Some(max_side);
    limits.max_image_height = Some(max_side);

    let mut reader = ImageReader::with_format(Cursor::new(bytes), format);
    reader.limits(limits);
    let image = reader.decode().map_err(|e| match e {
        ImageError::Limits(_) => InferenceError::ImageTooLarge { max_side },
        other => InferenceError::Decode(other),
    })?;
    Ok(image.to_rgb8())
}

/// Resizes to the model input size and normalises each channel, producing an
/// NCHW tensor with a batch of one.
pub fn to_input_tensor(image: &RgbImage, config: &ModelConfig) -> Result<Array4<f32>, InferenceError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(InferenceError::Preprocessing("image has no pixels".to_string()));
    }

    let size = config.input_size;
    let resized = imageops::resize(image, size, size, FilterType::Triangle);

    let side = size as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, side, side));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for channel in 0..3 {
            let value = pixel[channel] as f32 / 255.0;
            tensor[[0, channel, y as usize, x as usize]] =
                (value - config.mean[channel]) / config.std[channel];
        }
    }
    Ok(tensor)
}
