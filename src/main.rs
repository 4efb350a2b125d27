mod config;
mod error;
mod fetch;
mod handlers;
mod layout;
mod metrics;
mod models;
mod notify;
mod rate_limit;
mod render;
mod state;
mod wrap;

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Args;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // parse cli arguments
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // creating shared state
    let state = Arc::new(AppState::from_args(&args));

    let app = handlers::router(Arc::clone(&state)).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Image generator running on http://localhost:{}", args.port);
    info!("Assets from {}", state.assets.root().display());
    info!(
        "Rate limit: {} requests per {}s per IP, {} per {}s globally",
        args.ip_rate_limit, args.ip_rate_window, args.global_rate_limit, args.global_rate_window
    );
    if state.in_maintenance() {
        warn!("Maintenance mode is ON, every request gets 503");
    }
    if !state.notifier.enabled() {
        info!("No notify URL configured, request notifications disabled");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
