//! Review sub-entity model and DTOs.
//!
//! A review has no lifecycle of its own: it exists only inside the JSONB
//! `reviews` array of its parent device row. The struct here defines the
//! stored JSON shape, which doubles as the external API shape.

use aidex_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One element of a device's embedded `reviews` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    /// Username of the author. Weak reference: not a foreign key, and
    /// reviews survive deletion of the authoring account.
    pub author: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: Timestamp,
}

impl Review {
    /// Build a fresh review with a new id and the current timestamp.
    pub fn new(author: &str, rating: i32, comment: &str) -> Self {
        Review {
            id: Uuid::new_v4(),
            author: author.to_string(),
            rating,
            comment: comment.to_string(),
            created_at: chrono::Utc::now(),
        }
    }
}

/// DTO for partial review updates. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateReview {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

impl UpdateReview {
    /// True when no field is set, which callers must reject as a bad request.
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.comment.is_none()
    }
}

/// Aggregated rating stats for one device.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReviewStats {
    /// `None` when the device has no reviews (serialized as `null`).
    pub average_rating: Option<f64>,
    pub review_count: i32,
}

/// A review authored by a given user, flattened with its parent device.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuthoredReview {
    pub device_id: DbId,
    pub device_name: String,
    pub review_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: Timestamp,
}
