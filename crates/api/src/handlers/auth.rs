//! Handlers for the `/auth` resource (registration, login, logout, profile).

use aidex_core::error::CoreError;
use aidex_db::models::review::AuthoredReview;
use aidex_db::models::user::{CreateUser, UpdateProfile, UserResponse};
use aidex_db::repositories::{ReviewRepo, RevokedTokenRepo, UserRepo};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::issue_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Single message for both unknown-username and wrong-password failures.
/// Deliberately does not reveal which of the two happened.
const BAD_CREDENTIALS: &str = "Invalid username or password";

/// Argon2id hash of a throwaway password, verified against when the
/// username does not exist. The miss path then costs a real verification
/// and login timing does not reveal whether an account exists.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful authentication response returned by login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a new non-admin account. Returns 409 when the username is taken.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    if input.username.trim().is_empty() || input.password.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Username and password required".into(),
        )));
    }

    // Friendly existence check. The uq_users_username constraint is the
    // actual guarantee; a racing duplicate insert still maps to 409.
    if UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Username already exists".into(),
        )));
    }

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create_dto = CreateUser {
        username: input.username,
        password_hash: hashed,
        name: input.name,
        email: input.email,
    };

    let user = UserRepo::create(&state.pool, &create_dto).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns a bearer token whose
/// claims carry the stored admin flag.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let Some(user) = UserRepo::find_by_username(&state.pool, &input.username).await? else {
        let _ = verify_password(&input.password, DUMMY_HASH);
        return Err(AppError::Core(CoreError::Unauthorized(
            BAD_CREDENTIALS.into(),
        )));
    };

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            BAD_CREDENTIALS.into(),
        )));
    }

    let token = issue_token(&user.username, user.is_admin, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let expires_in = state.config.jwt.token_expiry_mins * 60;

    Ok(Json(LoginResponse {
        token,
        expires_in,
        user: user.into(),
    }))
}

/// POST /api/v1/auth/logout
///
/// Revoke the presented token. Other sessions of the same user stay
/// valid until natural expiry. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
    RevokedTokenRepo::revoke(&state.pool, &user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/profile
///
/// The caller's own account, password hash excluded.
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let record = UserRepo::find_by_username(&state.pool, &user.username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                key: user.username.clone(),
            })
        })?;
    Ok(Json(record.into()))
}

/// PUT /api/v1/auth/profile
///
/// Update the caller's display name and/or email.
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<UserResponse>> {
    if input.is_empty() {
        return Err(AppError::BadRequest("No update data provided".into()));
    }

    let record = UserRepo::update_profile(&state.pool, &user.username, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                key: user.username.clone(),
            })
        })?;
    Ok(Json(record.into()))
}

/// DELETE /api/v1/auth/profile
///
/// Delete the caller's account and revoke the presented token. The
/// author's reviews are left in place (weak reference, no cascade).
pub async fn delete_profile(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
    RevokedTokenRepo::revoke(&state.pool, &user.token).await?;

    let deleted = UserRepo::delete_by_username(&state.pool, &user.username).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            key: user.username,
        }))
    }
}

/// GET /api/v1/auth/myreviews
///
/// All reviews authored by the caller across every device.
pub async fn my_reviews(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<AuthoredReview>>> {
    let reviews = ReviewRepo::authored_by(&state.pool, &user.username).await?;
    Ok(Json(reviews))
}
