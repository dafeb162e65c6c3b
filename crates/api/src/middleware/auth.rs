//! Bearer-token authentication extractor for Axum handlers.

use aidex_core::error::CoreError;
use aidex_db::repositories::RevokedTokenRepo;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::jwt::{decode_token, TokenError};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a bearer token in the `Authorization`
/// header.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(username = %user.username, "handling request");
///     Ok(Json(()))
/// }
/// ```
///
/// Verification order: revocation list first, then signature and expiry.
/// A revoked token must be rejected outright even while it is still
/// cryptographically valid.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Username from the verified `sub` claim.
    pub username: String,
    /// Admin flag from the verified claims (not re-read from the database).
    pub admin: bool,
    /// The literal presented token. Logout and account deletion revoke
    /// exactly this value, leaving the user's other sessions alone.
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        if RevokedTokenRepo::is_revoked(&state.pool, token).await? {
            tracing::debug!("Rejected revoked token");
            return Err(AppError::Core(CoreError::Unauthorized(
                "Token has been revoked".into(),
            )));
        }

        let claims = decode_token(token, &state.config.jwt).map_err(|e| {
            let reason = match e {
                TokenError::Expired => "expired",
                TokenError::Invalid => "invalid",
            };
            tracing::debug!(reason, "Rejected token");
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            username: claims.sub,
            admin: claims.admin,
            token: token.to_string(),
        })
    }
}
