use gloo_file::File as GlooFile;
use gloo_net::http::Request;
use shared::{AnalysisResponse, ErrorResponse};

/// Posts one image to the analysis endpoint.
///
/// The error string is ready to show to the user: server-side failures already
/// carry the "Error processing image" prefix, transport failures get it here.
pub async fn analyze_image(file: &GlooFile) -> Result<AnalysisResponse, String> {
    let form_data = web_sys::FormData::new()
        .map_err(|_| "Error processing image: could not build upload form".to_string())?;
    form_data
        .append_with_blob_and_filename("image", file.as_ref(), &file.name())
        .map_err(|_| "Error processing image: could not attach file".to_string())?;

    let request = Request::post("/api/analyze")
        .body(form_data)
        .map_err(|e| format!("Error processing image: {}", e))?;

    let response = request
        .send()
        .await
        .map_err(|e| format!("Error processing image: network error: {}", e))?;

    if response.ok() {
        response
            .json::<AnalysisResponse>()
            .await
            .map_err(|e| format!("Error processing image: unreadable response: {}", e))
    } else {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) => Err(body.error),
            Err(_) => Err(format!("Error processing image: server returned {}", status)),
        }
    }
}
