//! Review ledger routes, merged into the `/devices` subtree.

use axum::routing::get;
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/reviews",
            get(reviews::list_reviews).post(reviews::add_review),
        )
        .route(
            "/{id}/reviews/{review_id}",
            axum::routing::put(reviews::update_review).delete(reviews::delete_review),
        )
        .route("/{id}/stats", get(reviews::review_stats))
}
