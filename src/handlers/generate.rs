use axum::{
    Json,
    extract::{ConnectInfo, State, rejection::JsonRejection},
    http::{Extensions, HeaderMap, header},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::AppError;
use crate::fetch::fetch_image;
use crate::layout::CERTIFICATE;
use crate::metrics::{RENDER_LATENCY, REQUEST_TOTAL};
use crate::models::{
    CaptionRequest, CertificateRequest, GeneratePayload, GenerationRequest, Notification,
    NotificationData,
};
use crate::rate_limit::client_ip;
use crate::render::{RenderError, render_caption, render_certificate};
use crate::state::AppState;

const MSG_BAD_BODY: &str = "Body permintaan harus berupa JSON yang valid.";

// Maintenance -> global limit -> IP limit -> validate -> (fetch) -> render
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    extensions: Extensions,
    payload: Result<Json<GeneratePayload>, JsonRejection>,
) -> Result<Response, AppError> {
    REQUEST_TOTAL.inc();

    if state.in_maintenance() {
        return Err(AppError::Maintenance);
    }

    let peer = extensions.get::<ConnectInfo<SocketAddr>>().map(|c| c.0);
    let ip = client_ip(&headers, peer);
    state.admission.admit(&ip)?;

    let Json(payload) = payload.map_err(|e| {
        debug!(ip = %ip, error = %e, "Rejected request body");
        AppError::Validation(MSG_BAD_BODY.to_string())
    })?;
    let request = payload.validate()?;

    let start_time = Instant::now();
    let png = match request {
        GenerationRequest::Caption(caption) => {
            let host = headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .unwrap_or("unknown")
                .to_string();
            caption_image(&state, caption, ip.clone(), host).await?
        }
        GenerationRequest::Certificate(card) => certificate_image(&state, card).await?,
    };

    let elapsed = start_time.elapsed();
    info!(ip = %ip, bytes = png.len(), elapsed_ms = elapsed.as_millis() as u64, "Image generated");

    Ok(png_response(png))
}

async fn caption_image(
    state: &AppState,
    caption: CaptionRequest,
    ip: String,
    host: String,
) -> Result<Vec<u8>, AppError> {
    let assets = Arc::clone(&state.assets);
    let profile = caption.style.profile();
    let text = caption.isi.clone();

    let png = render_blocking(move || render_caption(&assets, profile, &text)).await?;

    // detached, never awaited
    state.notifier.notify(Notification {
        ip,
        host,
        data: NotificationData {
            isi: caption.isi,
            option: caption.option,
        },
    });

    Ok(png)
}

async fn certificate_image(state: &AppState, card: CertificateRequest) -> Result<Vec<u8>, AppError> {
    let photo = fetch_image(&state.client, &card.profile, state.fetch_timeout).await?;

    let assets = Arc::clone(&state.assets);
    render_blocking(move || render_certificate(&assets, &CERTIFICATE, &card, &photo)).await
}

// Runs the CPU-bound render off the async workers. The latency histogram covers the
// render only, never the profile download.
async fn render_blocking<F>(render: F) -> Result<Vec<u8>, AppError>
where
    F: FnOnce() -> Result<Vec<u8>, RenderError> + Send + 'static,
{
    let timer = RENDER_LATENCY.start_timer();
    let png = tokio::task::spawn_blocking(render)
        .await
        .map_err(|e| AppError::Internal(format!("render task failed: {e}")))??;
    timer.observe_duration();
    Ok(png)
}

fn png_response(bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CONTENT_DISPOSITION, "inline; filename=\"generated.png\""),
        ],
        bytes,
    )
        .into_response()
}
