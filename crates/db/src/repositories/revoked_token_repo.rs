//! Repository for the `revoked_tokens` table (token blacklist).

use sqlx::PgPool;

/// Provides blacklist operations for bearer tokens.
pub struct RevokedTokenRepo;

impl RevokedTokenRepo {
    /// Insert the literal token into the blacklist. Idempotent: revoking
    /// an already-revoked token is a no-op.
    pub async fn revoke(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO revoked_tokens (token) VALUES ($1)
             ON CONFLICT (token) DO NOTHING",
        )
        .bind(token)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Check whether the literal token has been revoked.
    pub async fn is_revoked(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE token = $1)",
        )
        .bind(token)
        .fetch_one(pool)
        .await
    }
}
