//! bsa-cs library - Classification Service
//!
//! Thin HTTP transport around the shared classification core: one upload
//! endpoint and a health endpoint. The classifier choice is resolved once
//! before serving and shared read-only by every request.

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::Router;
use bsa_common::config::TomlConfig;
use bsa_common::{ClassificationDecision, Error};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod logging;

pub use crate::error::{ApiError, ApiResult};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Model-or-rules policy, fixed for the process lifetime
    pub decision: Arc<ClassificationDecision>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(decision: ClassificationDecision) -> Self {
        Self {
            decision: Arc::new(decision),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::predict_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router plus the deployment layers from configuration (CORS, upload limit)
pub fn build_app(state: AppState, config: &TomlConfig) -> bsa_common::Result<Router> {
    Ok(build_router(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(&config.cors_origins)?))
}

/// CORS restricted to the configured origins
pub fn cors_layer(origins: &[String]) -> bsa_common::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| Error::Config(format!("Invalid CORS origin {:?}: {}", origin, e)))
        })
        .collect::<bsa_common::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}
