//! Handlers for the `/devices` resource (catalog CRUD, search, geo, stats).
//!
//! Reads are public. Writes require the admin flag.

use aidex_core::error::CoreError;
use aidex_core::types::DbId;
use aidex_db::models::device::{
    CategoryLatencyStats, CreateDevice, Device, DeviceFilter, ManufacturerRatingStats,
    NearbyDevice, UpdateDevice,
};
use aidex_db::repositories::DeviceRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for `GET /devices`: 1-based page number (`pn`),
/// page size (`ps`), and optional attribute filters.
#[derive(Debug, Default, Deserialize)]
pub struct ListDevicesQuery {
    pub pn: Option<i64>,
    pub ps: Option<i64>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub ram_gb: Option<i32>,
}

/// Query parameters for `GET /devices/search`.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Query parameters for `GET /devices/nearme`.
#[derive(Debug, Deserialize)]
pub struct NearMeQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

fn validate_create(input: &CreateDevice) -> Result<(), AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Device name must not be blank".into(),
        )));
    }
    if input.category.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Device category must not be blank".into(),
        )));
    }
    if input.ram_gb < 0 {
        return Err(AppError::Core(CoreError::Validation(
            "ram_gb must not be negative".into(),
        )));
    }
    if input.price_usd < 0 {
        return Err(AppError::Core(CoreError::Validation(
            "price_usd must not be negative".into(),
        )));
    }
    Ok(())
}

fn validate_update(input: &UpdateDevice) -> Result<(), AppError> {
    if let Some(name) = &input.name {
        if name.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Device name must not be blank".into(),
            )));
        }
    }
    if let Some(category) = &input.category {
        if category.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Device category must not be blank".into(),
            )));
        }
    }
    if let Some(price) = input.price_usd {
        if price < 0 {
            return Err(AppError::Core(CoreError::Validation(
                "price_usd must not be negative".into(),
            )));
        }
    }
    Ok(())
}

/// GET /api/v1/devices
///
/// Paginated catalog listing with optional category, manufacturer, and
/// ram_gb filters. Defaults: page 1, ten per page.
pub async fn list_devices(
    State(state): State<AppState>,
    Query(params): Query<ListDevicesQuery>,
) -> AppResult<Json<Vec<Device>>> {
    let page = params.pn.unwrap_or(1).max(1);
    let page_size = params
        .ps
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    // Saturate: a page number near i64::MAX must not overflow the
    // multiplication, it just lands past the end of the table.
    let offset = (page - 1).saturating_mul(page_size);

    let filter = DeviceFilter {
        category: params.category,
        manufacturer: params.manufacturer,
        ram_gb: params.ram_gb,
    };
    let devices = DeviceRepo::list(&state.pool, &filter, page_size, offset).await?;
    Ok(Json(devices))
}

/// GET /api/v1/devices/{id}
pub async fn get_device(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Device>> {
    let device = DeviceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Device",
                key: id.to_string(),
            })
        })?;
    Ok(Json(device))
}

/// POST /api/v1/devices (admin only)
pub async fn create_device(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateDevice>,
) -> AppResult<(StatusCode, Json<Device>)> {
    validate_create(&input)?;
    let device = DeviceRepo::create(&state.pool, &input).await?;
    tracing::info!(device_id = device.id, name = %device.name, "Device created");
    Ok((StatusCode::CREATED, Json(device)))
}

/// PUT /api/v1/devices/{id} (admin only)
pub async fn update_device(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDevice>,
) -> AppResult<Json<Device>> {
    if input.is_empty() {
        return Err(AppError::BadRequest("No update data provided".into()));
    }
    validate_update(&input)?;

    let device = DeviceRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Device",
                key: id.to_string(),
            })
        })?;
    Ok(Json(device))
}

/// DELETE /api/v1/devices/{id} (admin only)
///
/// Removing the device removes its embedded reviews with it.
pub async fn delete_device(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = DeviceRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(device_id = id, "Device deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Device",
            key: id.to_string(),
        }))
    }
}

/// GET /api/v1/devices/search?q=...
///
/// Full-text search over name, category, and processor.
pub async fn search_devices(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Device>>> {
    let terms = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::BadRequest("Query parameter 'q' is required".into()))?;

    let devices = DeviceRepo::search(&state.pool, terms).await?;
    Ok(Json(devices))
}

/// GET /api/v1/devices/nearme?lat=...&lon=...
///
/// The ten closest devices within 1000 km of the given point.
pub async fn near_me(
    State(state): State<AppState>,
    Query(params): Query<NearMeQuery>,
) -> AppResult<Json<Vec<NearbyDevice>>> {
    let (lat, lon) = match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            return Err(AppError::BadRequest(
                "Query parameters 'lat' and 'lon' are required".into(),
            ))
        }
    };
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(AppError::BadRequest("Coordinates out of range".into()));
    }

    let devices = DeviceRepo::nearby(&state.pool, lat, lon).await?;
    Ok(Json(devices))
}

/// GET /api/v1/devices/stats/average-latency
pub async fn average_latency(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CategoryLatencyStats>>> {
    let stats = DeviceRepo::latency_by_category(&state.pool).await?;
    Ok(Json(stats))
}

/// GET /api/v1/devices/stats/top-rated-by-manufacturer
pub async fn top_rated_by_manufacturer(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ManufacturerRatingStats>>> {
    let stats = DeviceRepo::top_rated_by_manufacturer(&state.pool).await?;
    Ok(Json(stats))
}
