use actix_multipart::Multipart;
use futures::{StreamExt, TryStreamExt};

pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No image uploaded")]
    Missing,
    #[error("Image exceeds the {limit} byte upload limit")]
    TooLarge { limit: usize },
    #[error("Failed to read upload: {0}")]
    Multipart(String),
}

/// Reads the first non-empty `image` field of a multipart form.
///
/// Other fields are drained and ignored. Reading stops as soon as the field grows
/// past `limit` bytes.
pub async fn read_image_field(mut payload: Multipart, limit: usize) -> Result<Vec<u8>, UploadError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| UploadError::Multipart(e.to_string()))?
    {
        let is_image = field.name() == Some(IMAGE_FIELD);
        let mut image_data = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| UploadError::Multipart(e.to_string()))?;
            if !is_image {
                continue;
            }
            if image_data.len() + data.len() > limit {
                return Err(UploadError::TooLarge { limit });
            }
            image_data.extend_from_slice(&data);
        }
        if is_image && !image_data.is_empty() {
            return Ok(image_data);
        }
    }
    Err(UploadError::Missing)
}
