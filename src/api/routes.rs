//! API route definitions.

use super::state::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
}

/// Prometheus text exposition of the incident gauges.
pub async fn metrics(State(state): State<AppState>) -> String {
    state.registry.render()
}

async fn health() -> Json<Value> {
    Json(json!({
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION")
        },
        "meta": {
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

/// Latest completed poll cycle, or null before the first cycle finishes.
async fn status(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state
        .snapshot
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone();
    match snapshot {
        Some(cycle) => Json(json!({ "data": cycle })),
        None => Json(json!({ "data": null, "meta": { "message": "no cycle completed yet" } })),
    }
}
