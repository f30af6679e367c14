//! Single-image classification endpoint

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use bsa_common::Label;
use serde::Serialize;
use tracing::info;

use crate::{ApiError, ApiResult, AppState};

/// Multipart field carrying the scan
pub const UPLOAD_FIELD: &str = "file";

/// Accepted upload content types
pub const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/jpg"];

/// Successful classification
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub label: Label,
}

/// True if the declared content type (parameters ignored) is accepted
pub fn is_allowed_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_CONTENT_TYPES.contains(&essence.as_str())
}

/// POST /predict
///
/// Accepts one scan in multipart field `file`. The content type is checked
/// before the payload is read; rejected uploads never reach extraction.
pub async fn predict(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<PredictResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !is_allowed_content_type(&content_type) {
            return Err(ApiError::UnsupportedMediaType(format!(
                "{:?} (expected one of {})",
                content_type,
                ALLOWED_CONTENT_TYPES.join(", ")
            )));
        }

        let filename = field.file_name().unwrap_or("<unnamed>").to_string();
        let bytes = field.bytes().await?;

        // Decode, extraction and inference are CPU-bound
        let decision = state.decision.clone();
        let label = tokio::task::spawn_blocking(move || decision.classify_image(&bytes))
            .await
            .map_err(|e| ApiError::Internal(format!("Classification task failed: {}", e)))??;

        info!(
            "Classified {} as {} ({} mode)",
            filename,
            label,
            state.decision.mode()
        );

        return Ok(Json(PredictResponse { label }));
    }

    Err(ApiError::BadRequest(format!(
        "missing multipart field {:?}",
        UPLOAD_FIELD
    )))
}

/// Build prediction routes
pub fn predict_routes() -> Router<AppState> {
    Router::new().route("/predict", post(predict))
}
