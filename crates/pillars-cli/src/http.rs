//! HTTP JSON endpoint: `POST /api/chart` and `GET /health`.

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use pillars_core::{WireProfile, analyze, import_chart};
use tower_http::trace::TraceLayer;

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chart", post(api_chart))
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
    }
    tracing::info!("shutting down");
}

async fn health() -> impl IntoResponse {
    "OK"
}

/// Wire chart in, camelCase profile out. Bad input is a 400 with `{"error": ...}`.
async fn api_chart(body: String) -> Response {
    match import_chart(&body) {
        Ok(chart) => {
            let profile = analyze(&chart);
            Json(WireProfile::new(&chart, &profile)).into_response()
        }
        Err(e) => {
            tracing::debug!("rejected chart: {e}");
            let body = serde_json::json!({ "error": e.to_string() });
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
    }
}
