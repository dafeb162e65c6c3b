//! Route table assembly.
//!
//! Each submodule owns the routes for one resource and exposes a
//! `router()` returning `Router<AppState>`. [`api_routes`] nests them
//! under their path prefixes; the version prefix is applied by the
//! top-level router builder.

pub mod admin;
pub mod auth;
pub mod devices;
pub mod health;
pub mod reviews;

use axum::Router;

use crate::state::AppState;

/// All versioned API routes, relative to the `/api/v1` prefix.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/devices", devices::router().merge(reviews::router()))
}
