//! Device catalog routes.
//!
//! Literal paths (`/search`, `/nearme`, `/stats/...`) are registered
//! alongside the `{id}` routes; Axum prefers the literal match.

use axum::routing::get;
use axum::Router;

use crate::handlers::devices;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(devices::list_devices).post(devices::create_device))
        .route("/search", get(devices::search_devices))
        .route("/nearme", get(devices::near_me))
        .route("/stats/average-latency", get(devices::average_latency))
        .route(
            "/stats/top-rated-by-manufacturer",
            get(devices::top_rated_by_manufacturer),
        )
        .route(
            "/{id}",
            get(devices::get_device)
                .put(devices::update_device)
                .delete(devices::delete_device),
        )
}
