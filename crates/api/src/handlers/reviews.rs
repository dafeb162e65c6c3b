//! Handlers for the review ledger nested under `/devices/{id}/reviews`.
//!
//! Reads are public. Writes require authentication; edits and deletes of
//! an existing review additionally require authorship unless the caller
//! is an admin. A non-owner hitting someone else's review gets the same
//! 404 as a missing review, so review existence never leaks.

use aidex_core::error::CoreError;
use aidex_core::rating::validate_rating;
use aidex_core::types::DbId;
use aidex_db::models::review::{Review, ReviewStats, UpdateReview};
use aidex_db::repositories::ReviewRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /devices/{id}/reviews`.
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

/// Response for `GET /devices/{id}/stats`.
#[derive(Debug, Serialize)]
pub struct DeviceReviewStats {
    pub device_id: DbId,
    #[serde(flatten)]
    pub stats: ReviewStats,
}

fn device_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Device",
        key: id.to_string(),
    })
}

fn review_not_found(id: Uuid) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Review",
        key: id.to_string(),
    })
}

/// GET /api/v1/devices/{id}/reviews
///
/// All reviews for one device, oldest first.
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(device_id): Path<DbId>,
) -> AppResult<Json<Vec<Review>>> {
    let reviews = ReviewRepo::list_for_device(&state.pool, device_id)
        .await?
        .ok_or_else(|| device_not_found(device_id))?;
    Ok(Json(reviews))
}

/// POST /api/v1/devices/{id}/reviews
///
/// Append a review as the authenticated caller. The author is always the
/// verified token subject, never taken from the request body.
pub async fn add_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(device_id): Path<DbId>,
    Json(input): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<Review>)> {
    validate_rating(input.rating)?;

    let review = Review::new(&user.username, input.rating, &input.comment);
    let appended = ReviewRepo::append(&state.pool, device_id, &review).await?;
    if !appended {
        return Err(device_not_found(device_id));
    }

    tracing::info!(device_id, review_id = %review.id, "Review added");
    Ok((StatusCode::CREATED, Json(review)))
}

/// PUT /api/v1/devices/{id}/reviews/{review_id}
///
/// Partially update one review. Admins may edit any review; everyone
/// else only their own.
pub async fn update_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path((device_id, review_id)): Path<(DbId, Uuid)>,
    Json(input): Json<UpdateReview>,
) -> AppResult<StatusCode> {
    if input.is_empty() {
        return Err(AppError::BadRequest("No update data provided".into()));
    }
    if let Some(rating) = input.rating {
        validate_rating(rating)?;
    }

    // None lifts the author predicate for admins.
    let author = (!user.admin).then_some(user.username.as_str());
    let updated = ReviewRepo::update(&state.pool, device_id, review_id, author, &input).await?;
    if !updated {
        return Err(review_not_found(review_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/devices/{id}/reviews/{review_id}
///
/// Remove one review under the same ownership rules as update.
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path((device_id, review_id)): Path<(DbId, Uuid)>,
) -> AppResult<StatusCode> {
    let author = (!user.admin).then_some(user.username.as_str());
    let removed = ReviewRepo::remove(&state.pool, device_id, review_id, author).await?;
    if !removed {
        return Err(review_not_found(review_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/devices/{id}/stats
///
/// Average rating and review count for one device. A review-less device
/// reports a null average and a zero count.
pub async fn review_stats(
    State(state): State<AppState>,
    Path(device_id): Path<DbId>,
) -> AppResult<Json<DeviceReviewStats>> {
    let stats = ReviewRepo::stats_for_device(&state.pool, device_id)
        .await?
        .ok_or_else(|| device_not_found(device_id))?;
    Ok(Json(DeviceReviewStats { device_id, stats }))
}
