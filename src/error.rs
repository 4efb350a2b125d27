use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::fetch::FetchError;
use crate::metrics::{RENDER_FAILURES, VALIDATION_FAILURES};
use crate::render::RenderError;

pub const MSG_MAINTENANCE: &str =
    "Server sedang dalam proses maintenance, Harap coba lagi beberapa saat.";
pub const MSG_GLOBAL_LIMITED: &str =
    "Server menerima terlalu banyak permintaan. Coba lagi sebentar lagi.";
pub const MSG_IP_LIMITED: &str = "Terlalu banyak permintaan dari IP ini. Coba lagi nanti.";
pub const MSG_GENERIC_FAILURE: &str = "Gagal memproses gambar.";

/// Application-level error type.
/// Every variant maps to a JSON `{ "message": ... }` body; causes are logged, never returned.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("maintenance mode is active")]
    Maintenance,

    #[error("global rate limit exceeded")]
    GlobalRateLimited,

    #[error("per-IP rate limit exceeded")]
    IpRateLimited,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("profile image fetch failed: {0}")]
    UpstreamFetch(#[from] FetchError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Maintenance | AppError::GlobalRateLimited => StatusCode::SERVICE_UNAVAILABLE,
            AppError::IpRateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamFetch(_) | AppError::Render(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Maintenance => MSG_MAINTENANCE.to_string(),
            AppError::GlobalRateLimited => MSG_GLOBAL_LIMITED.to_string(),
            AppError::IpRateLimited => MSG_IP_LIMITED.to_string(),
            AppError::Validation(msg) => {
                VALIDATION_FAILURES.inc();
                msg.clone()
            }
            AppError::UpstreamFetch(e) => {
                RENDER_FAILURES.inc();
                tracing::error!("Profile image fetch failed: {e}");
                MSG_GENERIC_FAILURE.to_string()
            }
            AppError::Render(e) => {
                RENDER_FAILURES.inc();
                tracing::error!("Error generate-image: {e}");
                MSG_GENERIC_FAILURE.to_string()
            }
            AppError::Internal(e) => {
                RENDER_FAILURES.inc();
                tracing::error!("Internal error: {e}");
                MSG_GENERIC_FAILURE.to_string()
            }
        };

        (self.status(), Json(json!({ "message": message }))).into_response()
    }
}
