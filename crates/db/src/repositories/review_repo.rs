//! Review ledger: mutation of the `reviews` array embedded in a device row.
//!
//! Every mutation here is a single conditional `UPDATE` on the parent
//! device row. The row is the unit of atomicity, so a review change is
//! never half-applied and concurrent appends to the same device cannot
//! lose each other (PostgreSQL serializes writers on the row).
//!
//! Ownership is enforced inside the same statement: when `author` is
//! `Some`, the match predicate also requires the review's author field, so
//! an unauthorized caller and a missing review are indistinguishable to
//! the caller. That conflation is deliberate -- non-owners learn nothing
//! about a review's existence.

use aidex_core::types::DbId;
use serde_json::Map;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::review::{AuthoredReview, Review, ReviewStats, UpdateReview};

/// Provides atomic operations on a device's embedded review sequence.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Append a review to the device's array.
    ///
    /// Returns `true` if the device row matched. The append is a genuine
    /// atomic push, never read-modify-write.
    pub async fn append(
        pool: &PgPool,
        device_id: DbId,
        review: &Review,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE devices
             SET reviews = reviews || jsonb_build_array($2::jsonb),
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(device_id)
        .bind(Json(review))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a partial update to one review, matched by (device id,
    /// review id) and, for non-admin callers, the author's username.
    ///
    /// Returns `true` when a review matched all predicates. `false` covers
    /// both "no such review" and "not the author" -- callers must not try
    /// to distinguish the two.
    pub async fn update(
        pool: &PgPool,
        device_id: DbId,
        review_id: Uuid,
        author: Option<&str>,
        input: &UpdateReview,
    ) -> Result<bool, sqlx::Error> {
        let patch = build_patch(input);

        let result = sqlx::query(
            "UPDATE devices
             SET reviews = (
                     SELECT COALESCE(jsonb_agg(
                                CASE WHEN r.elem->>'id' = $2
                                     THEN r.elem || $4::jsonb
                                     ELSE r.elem END
                                ORDER BY r.ord), '[]'::jsonb)
                     FROM jsonb_array_elements(reviews) WITH ORDINALITY AS r(elem, ord)
                 ),
                 updated_at = NOW()
             WHERE id = $1
               AND EXISTS (
                   SELECT 1 FROM jsonb_array_elements(reviews) AS e(elem)
                   WHERE e.elem->>'id' = $2
                     AND ($3::text IS NULL OR e.elem->>'author' = $3)
               )",
        )
        .bind(device_id)
        .bind(review_id.to_string())
        .bind(author)
        .bind(Json(patch))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove one review, matched by (device id, review id) and, for
    /// non-admin callers, the author's username.
    ///
    /// Same not-found/not-authorized conflation as [`ReviewRepo::update`].
    pub async fn remove(
        pool: &PgPool,
        device_id: DbId,
        review_id: Uuid,
        author: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE devices
             SET reviews = COALESCE((
                     SELECT jsonb_agg(r.elem ORDER BY r.ord)
                     FROM jsonb_array_elements(reviews) WITH ORDINALITY AS r(elem, ord)
                     WHERE NOT (r.elem->>'id' = $2
                                AND ($3::text IS NULL OR r.elem->>'author' = $3))
                 ), '[]'::jsonb),
                 updated_at = NOW()
             WHERE id = $1
               AND EXISTS (
                   SELECT 1 FROM jsonb_array_elements(reviews) AS e(elem)
                   WHERE e.elem->>'id' = $2
                     AND ($3::text IS NULL OR e.elem->>'author' = $3)
               )",
        )
        .bind(device_id)
        .bind(review_id.to_string())
        .bind(author)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All reviews for one device in insertion order.
    ///
    /// Returns `None` when the device itself is absent; a device with no
    /// reviews yields `Some` of an empty vec.
    pub async fn list_for_device(
        pool: &PgPool,
        device_id: DbId,
    ) -> Result<Option<Vec<Review>>, sqlx::Error> {
        let row = sqlx::query_scalar::<_, Json<Vec<Review>>>(
            "SELECT reviews FROM devices WHERE id = $1",
        )
        .bind(device_id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|json| json.0))
    }

    /// Average rating and review count for one device.
    ///
    /// Returns `None` when the device is absent. A device with no reviews
    /// yields a `None` average and a zero count, never an error.
    pub async fn stats_for_device(
        pool: &PgPool,
        device_id: DbId,
    ) -> Result<Option<ReviewStats>, sqlx::Error> {
        sqlx::query_as::<_, ReviewStats>(
            "SELECT (SELECT AVG((e.elem->>'rating')::float8)
                     FROM jsonb_array_elements(reviews) AS e(elem)) AS average_rating,
                    jsonb_array_length(reviews) AS review_count
             FROM devices
             WHERE id = $1",
        )
        .bind(device_id)
        .fetch_optional(pool)
        .await
    }

    /// All reviews authored by one user across every device, newest first.
    pub async fn authored_by(
        pool: &PgPool,
        username: &str,
    ) -> Result<Vec<AuthoredReview>, sqlx::Error> {
        sqlx::query_as::<_, AuthoredReview>(
            "SELECT d.id AS device_id,
                    d.name AS device_name,
                    (r.elem->>'id')::uuid AS review_id,
                    (r.elem->>'rating')::int AS rating,
                    r.elem->>'comment' AS comment,
                    (r.elem->>'created_at')::timestamptz AS created_at
             FROM devices d,
                  jsonb_array_elements(d.reviews) AS r(elem)
             WHERE r.elem->>'author' = $1
             ORDER BY created_at DESC",
        )
        .bind(username)
        .fetch_all(pool)
        .await
    }
}

/// Build the JSONB patch object from the set fields of an [`UpdateReview`].
fn build_patch(input: &UpdateReview) -> serde_json::Value {
    let mut patch = Map::new();
    if let Some(rating) = input.rating {
        patch.insert("rating".to_string(), rating.into());
    }
    if let Some(comment) = &input.comment {
        patch.insert("comment".to_string(), comment.clone().into());
    }
    serde_json::Value::Object(patch)
}
