use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use log::{error, info, warn};
use shared::{ErrorResponse, HealthResponse};
use uuid::Uuid;

use crate::analysis;
use crate::cache::cache_service::CacheService;
use crate::context::AppContext;
use crate::inference::InferenceError;
use crate::upload::{self, UploadError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("Inference task failed: {0}")]
    Blocking(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Upload(UploadError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upload(_) => StatusCode::BAD_REQUEST,
            ApiError::Inference(InferenceError::ImageTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            ApiError::Inference(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Inference(_) | ApiError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: format!("Error processing image: {}", self),
        })
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: Option<String>) {
    cfg.service(web::resource("/api/analyze").route(web::post().to(analyze_image)))
        .service(web::resource("/api/health").route(web::get().to(health)));
    if let Some(dir) = frontend_dir {
        cfg.service(Files::new("/", dir).index_file("index.html"));
    }
}

async fn analyze_image(
    context: web::Data<AppContext>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();

    let image_data = upload::read_image_field(payload, context.config.server.max_upload_bytes)
        .await
        .inspect_err(|e| warn!("[{}] rejected upload: {}", request_id, e))?;
    info!("[{}] received {} bytes", request_id, image_data.len());

    let image_hash = CacheService::calculate_image_hash(&image_data);
    if let Some(cached) = context.cache.get_cached_analysis(&image_hash).await {
        info!("[{}] served cached analysis {}", request_id, cached.id);
        return Ok(HttpResponse::Ok().json(cached));
    }

    let model = context.model.clone();
    let config = context.config.clone();
    let result = web::block(move || {
        analysis::analyze(request_id, &image_data, model.as_ref(), &config)
    })
    .await
    .map_err(|e| ApiError::Blocking(e.to_string()))?;

    let response = result.inspect_err(|e| error!("[{}] analysis failed: {}", request_id, e))?;
    context
        .cache
        .cache_analysis(image_hash, response.clone())
        .await;

    Ok(HttpResponse::Ok().json(response))
}

async fn health(context: web::Data<AppContext>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: true,
        device: context.model.device(),
        cached_results: context.cache.len().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::png_bytes;
    use crate::config::AppConfig;
    use crate::inference::testing::StubModel;
    use actix_web::http::header::CONTENT_TYPE;
    use actix_web::{App, test};
    use shared::{AnalysisResponse, Disease};
    use std::sync::Arc;

    const BOUNDARY: &str = "xrayboundary";

    fn multipart_body(parts: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (field, bytes) in parts {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"scan.png\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_parts(parts: &[(&str, &[u8])]) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/analyze")
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart_body(parts))
    }

    fn upload(field: &str, bytes: &[u8]) -> test::TestRequest {
        upload_parts(&[(field, bytes)])
    }

    fn context(config: AppConfig) -> AppContext {
        AppContext::new(Arc::new(StubModel::new(&[2.0, -1.0, 0.5])), config)
    }

    #[actix_web::test]
    async fn analyze_returns_predictions_and_heatmaps() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(context(AppConfig::default())))
                .configure(|cfg| configure_routes(cfg, None)),
        )
        .await;

        let resp = test::call_service(&app, upload("image", &png_bytes(48, 32)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: AnalysisResponse = test::read_body_json(resp).await;
        assert_eq!(body.predictions.len(), 3);
        for prediction in body.predictions.values() {
            assert!((0.0..=1.0).contains(&prediction.confidence));
        }
        let order: Vec<Disease> = body.heatmaps.iter().map(|h| h.disease).collect();
        assert_eq!(order, Disease::ALL.to_vec());
        assert_eq!(body.highest_confidence.unwrap().disease, Disease::Pneumonia);
    }

    #[actix_web::test]
    async fn predictions_are_keyed_by_disease_name() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(context(AppConfig::default())))
                .configure(|cfg| configure_routes(cfg, None)),
        )
        .await;

        let body: serde_json::Value =
            test::call_and_read_body_json(&app, upload("image", &png_bytes(12, 12)).to_request())
                .await;
        assert_eq!(body["predictions"]["Pneumonia"]["label"], "Disease");
        assert_eq!(body["predictions"]["Tuberculosis"]["label"], "Normal");
        assert_eq!(body["highest_confidence"]["disease"], "Pneumonia");
        assert_eq!(body["heatmaps"].as_array().map(Vec::len), Some(3));
    }

    #[actix_web::test]
    async fn repeated_upload_is_served_from_cache() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(context(AppConfig::default())))
                .configure(|cfg| configure_routes(cfg, None)),
        )
        .await;

        let bytes = png_bytes(20, 20);
        let first: AnalysisResponse =
            test::call_and_read_body_json(&app, upload("image", &bytes).to_request()).await;
        let second: AnalysisResponse =
            test::call_and_read_body_json(&app, upload("image", &bytes).to_request()).await;
        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.id, second.id);
    }

    #[actix_web::test]
    async fn corrupt_upload_is_reported_and_server_keeps_serving() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(context(AppConfig::default())))
                .configure(|cfg| configure_routes(cfg, None)),
        )
        .await;

        let resp = test::call_service(&app, upload("image", b"this is a text file").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert!(body.error.starts_with("Error processing image:"));

        let resp = test::call_service(&app, upload("image", &png_bytes(8, 8)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn missing_image_field_is_a_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(context(AppConfig::default())))
                .configure(|cfg| configure_routes(cfg, None)),
        )
        .await;

        let resp = test::call_service(&app, upload("notes", b"hello").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "Error processing image: No image uploaded");
    }

    #[actix_web::test]
    async fn oversized_upload_is_rejected() {
        let mut config = AppConfig::default();
        config.server.max_upload_bytes = 64;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(context(config)))
                .configure(|cfg| configure_routes(cfg, None)),
        )
        .await;

        let resp = test::call_service(&app, upload("image", &png_bytes(64, 64)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[actix_web::test]
    async fn first_non_empty_image_field_is_analysed() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(context(AppConfig::default())))
                .configure(|cfg| configure_routes(cfg, None)),
        )
        .await;

        let scan = png_bytes(24, 16);
        let resp = test::call_service(
            &app,
            upload_parts(&[("image", &b""[..]), ("image", scan.as_slice())]).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: AnalysisResponse = test::read_body_json(resp).await;
        assert_eq!((body.width, body.height), (24, 16));

        let other = png_bytes(10, 12);
        let resp = test::call_service(
            &app,
            upload_parts(&[
                ("notes", &b"patient 7"[..]),
                ("image", other.as_slice()),
                ("image", scan.as_slice()),
            ])
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: AnalysisResponse = test::read_body_json(resp).await;
        assert_eq!((body.width, body.height), (10, 12));
    }

    #[actix_web::test]
    async fn image_over_side_limit_is_too_large() {
        let mut config = AppConfig::default();
        config.server.max_image_side = 32;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(context(config)))
                .configure(|cfg| configure_routes(cfg, None)),
        )
        .await;

        let resp = test::call_service(&app, upload("image", &png_bytes(48, 8)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(
            body.error,
            "Error processing image: Image is larger than 32x32 pixels"
        );

        let resp = test::call_service(&app, upload("image", &png_bytes(32, 8)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn model_output_mismatch_is_a_server_error() {
        let context = AppContext::new(
            Arc::new(StubModel::new(&[0.1, 0.2])),
            AppConfig::default(),
        );
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(context))
                .configure(|cfg| configure_routes(cfg, None)),
        )
        .await;

        let resp = test::call_service(&app, upload("image", &png_bytes(8, 8)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn health_reports_device_and_cache_size() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(context(AppConfig::default())))
                .configure(|cfg| configure_routes(cfg, None)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.device, "stub");
        assert_eq!(body.cached_results, 0);
    }
}
