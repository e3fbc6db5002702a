use anyhow::{Error, Result, anyhow};
use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::SERVICE_NAME;
use crate::models::health::HealthResponse;

/// Liveness surface. Deliberately stateless: it reports that the process
/// is up, not that the pipeline is healthy.
pub async fn run_api_server(port: u16) -> Result<(), Error> {
    let app = Router::new()
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow!("Failed to bind {}: {}", addr, e))?;

    info!(address = %addr, "Health check server started");

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow!("Health server failed: {}", e))?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            service: SERVICE_NAME.to_string(),
        }),
    )
}
