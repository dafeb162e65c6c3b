//! Routes for registration, sessions, and the caller's own account.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route(
            "/profile",
            get(auth::get_profile)
                .put(auth::update_profile)
                .delete(auth::delete_profile),
        )
        .route("/myreviews", get(auth::my_reviews))
}
