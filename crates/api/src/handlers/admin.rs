//! Handlers for the `/admin` resource (user management).
//!
//! All handlers require the admin flag via [`RequireAdmin`].

use aidex_core::error::CoreError;
use aidex_core::types::DbId;
use aidex_db::models::user::UserResponse;
use aidex_db::repositories::UserRepo;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

/// GET /api/v1/admin/users
///
/// List all users. Password hashes are excluded by construction:
/// [`UserResponse`] has no such field.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool).await?;
    let responses: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    Ok(Json(responses))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Delete any account except the caller's own. Returns 204 No Content.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let target = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                key: id.to_string(),
            })
        })?;

    if target.username == admin.username {
        return Err(AppError::BadRequest(
            "Admins cannot delete their own account".into(),
        ));
    }

    let deleted = UserRepo::delete_by_id(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            key: id.to_string(),
        }))
    }
}
