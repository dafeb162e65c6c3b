//! Repository for the `devices` table.
//!
//! Review mutations live in [`crate::repositories::review_repo`]; this
//! repository covers the device's own scalar attributes and catalog queries.

use aidex_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::device::{
    CategoryLatencyStats, CreateDevice, Device, DeviceFilter, ManufacturerRatingStats,
    NearbyDevice, UpdateDevice,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, category, processor, ram_gb, manufacturer_name, \
                        manufacturer_country, storage, avg_inference_latency_ms, power_watts, \
                        price_usd, release_year, image_url, benchmarks, location_lat, \
                        location_lon, reviews, created_at, updated_at";

/// Search radius cap for [`DeviceRepo::nearby`], in meters (1000 km).
const NEARBY_MAX_DISTANCE_METERS: f64 = 1_000_000.0;

/// Result cap for [`DeviceRepo::nearby`].
const NEARBY_LIMIT: i64 = 10;

/// Provides CRUD and catalog queries for devices.
pub struct DeviceRepo;

impl DeviceRepo {
    /// Insert a new device with an empty review array, returning the row.
    pub async fn create(pool: &PgPool, input: &CreateDevice) -> Result<Device, sqlx::Error> {
        let query = format!(
            "INSERT INTO devices (name, category, processor, ram_gb, manufacturer_name,
                                  manufacturer_country, storage, avg_inference_latency_ms,
                                  power_watts, price_usd, release_year, benchmarks,
                                  location_lat, location_lon)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.processor)
            .bind(input.ram_gb)
            .bind(&input.manufacturer_name)
            .bind(&input.manufacturer_country)
            .bind(&input.storage)
            .bind(input.avg_inference_latency_ms)
            .bind(input.power_watts)
            .bind(input.price_usd)
            .bind(input.release_year)
            .bind(Json(&input.benchmarks))
            .bind(input.location_lat)
            .bind(input.location_lon)
            .fetch_one(pool)
            .await
    }

    /// Find a device by ID, embedded reviews included.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE id = $1");
        sqlx::query_as::<_, Device>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List devices with optional filters, paginated in id order.
    pub async fn list(
        pool: &PgPool,
        filter: &DeviceFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Device>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM devices
             WHERE ($1::text IS NULL OR category = $1)
               AND ($2::text IS NULL OR manufacturer_name = $2)
               AND ($3::int IS NULL OR ram_gb = $3)
             ORDER BY id
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(&filter.category)
            .bind(&filter.manufacturer)
            .bind(filter.ram_gb)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Update a device. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDevice,
    ) -> Result<Option<Device>, sqlx::Error> {
        let query = format!(
            "UPDATE devices SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                price_usd = COALESCE($4, price_usd),
                processor = COALESCE($5, processor),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.category)
            .bind(input.price_usd)
            .bind(&input.processor)
            .fetch_optional(pool)
            .await
    }

    /// Delete a device (and with it all embedded reviews).
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Full-text search over name, category, and processor.
    pub async fn search(pool: &PgPool, terms: &str) -> Result<Vec<Device>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM devices
             WHERE to_tsvector('english', name || ' ' || category || ' ' || processor)
                   @@ websearch_to_tsquery('english', $1)
             ORDER BY id"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(terms)
            .fetch_all(pool)
            .await
    }

    /// The ten devices closest to the given point, within 1000 km.
    ///
    /// Distance is great-circle (haversine) over the stored coordinates;
    /// devices without coordinates are skipped.
    pub async fn nearby(
        pool: &PgPool,
        lat: f64,
        lon: f64,
    ) -> Result<Vec<NearbyDevice>, sqlx::Error> {
        let query = format!(
            "SELECT * FROM (
                 SELECT {COLUMNS},
                        6371000.0 * 2.0 * asin(sqrt(
                            pow(sin(radians(($1 - location_lat) / 2.0)), 2) +
                            cos(radians($1)) * cos(radians(location_lat)) *
                            pow(sin(radians(($2 - location_lon) / 2.0)), 2)
                        )) AS distance_meters
                 FROM devices
                 WHERE location_lat IS NOT NULL AND location_lon IS NOT NULL
             ) AS with_distance
             WHERE distance_meters <= $3
             ORDER BY distance_meters
             LIMIT $4"
        );
        sqlx::query_as::<_, NearbyDevice>(&query)
            .bind(lat)
            .bind(lon)
            .bind(NEARBY_MAX_DISTANCE_METERS)
            .bind(NEARBY_LIMIT)
            .fetch_all(pool)
            .await
    }

    /// Average inference latency and device count per category,
    /// fastest category first.
    pub async fn latency_by_category(
        pool: &PgPool,
    ) -> Result<Vec<CategoryLatencyStats>, sqlx::Error> {
        sqlx::query_as::<_, CategoryLatencyStats>(
            "SELECT category,
                    AVG(avg_inference_latency_ms)::float8 AS average_latency,
                    COUNT(*) AS device_count
             FROM devices
             GROUP BY category
             ORDER BY average_latency",
        )
        .fetch_all(pool)
        .await
    }

    /// Average embedded-review rating and review count per manufacturer,
    /// best-rated first. Manufacturers with no reviews do not appear.
    pub async fn top_rated_by_manufacturer(
        pool: &PgPool,
    ) -> Result<Vec<ManufacturerRatingStats>, sqlx::Error> {
        sqlx::query_as::<_, ManufacturerRatingStats>(
            "SELECT d.manufacturer_name AS manufacturer,
                    AVG((r.elem->>'rating')::float8) AS average_rating,
                    COUNT(*) AS review_count
             FROM devices d,
                  jsonb_array_elements(d.reviews) AS r(elem)
             GROUP BY d.manufacturer_name
             ORDER BY average_rating DESC",
        )
        .fetch_all(pool)
        .await
    }
}
