//! Device entity model and DTOs.

use aidex_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::models::review::Review;

/// Inference benchmark figures stored as a JSONB object on the device row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Benchmarks {
    pub resnet50_fps: f64,
    pub bert_latency_ms: i32,
    pub power_efficiency_fps_per_watt: f64,
}

/// Full device row from the `devices` table, embedded reviews included.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Device {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub processor: String,
    pub ram_gb: i32,
    pub manufacturer_name: String,
    pub manufacturer_country: String,
    pub storage: String,
    pub avg_inference_latency_ms: i32,
    pub power_watts: i32,
    pub price_usd: i32,
    pub release_year: i32,
    pub image_url: String,
    pub benchmarks: Json<Benchmarks>,
    pub location_lat: Option<f64>,
    pub location_lon: Option<f64>,
    pub reviews: Json<Vec<Review>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new device. Reviews always start empty.
#[derive(Debug, Deserialize)]
pub struct CreateDevice {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub processor: String,
    #[serde(default)]
    pub ram_gb: i32,
    #[serde(default = "default_unknown")]
    pub manufacturer_name: String,
    #[serde(default = "default_unknown")]
    pub manufacturer_country: String,
    #[serde(default)]
    pub storage: String,
    #[serde(default)]
    pub avg_inference_latency_ms: i32,
    #[serde(default)]
    pub power_watts: i32,
    #[serde(default)]
    pub price_usd: i32,
    #[serde(default = "default_release_year")]
    pub release_year: i32,
    #[serde(default)]
    pub benchmarks: Benchmarks,
    pub location_lat: Option<f64>,
    pub location_lon: Option<f64>,
}

fn default_unknown() -> String {
    "Unknown".to_string()
}

fn default_release_year() -> i32 {
    2025
}

/// DTO for updating an existing device. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateDevice {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price_usd: Option<i32>,
    pub processor: Option<String>,
}

impl UpdateDevice {
    /// True when no field is set, which callers must reject as a bad request.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price_usd.is_none()
            && self.processor.is_none()
    }
}

/// Optional filters for device listing.
#[derive(Debug, Default, Deserialize)]
pub struct DeviceFilter {
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub ram_gb: Option<i32>,
}

/// A device plus its haversine distance from a query point.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NearbyDevice {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub device: Device,
    pub distance_meters: f64,
}

/// Average inference latency per category.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryLatencyStats {
    pub category: String,
    pub average_latency: f64,
    pub device_count: i64,
}

/// Average embedded-review rating per manufacturer.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ManufacturerRatingStats {
    pub manufacturer: String,
    pub average_rating: f64,
    pub review_count: i64,
}
