//! Liveness endpoint, mounted outside the versioned API prefix.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health
///
/// Reports process liveness and database reachability. Always returns
/// 200; a broken pool shows up as `"db_healthy": false`.
async fn health(State(state): State<AppState>) -> Json<Value> {
    let db_healthy = aidex_db::health_check(&state.pool).await.is_ok();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "db_healthy": db_healthy,
    }))
}
