//! PostgreSQL implementation of TokenStore

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use warden_core::entities::{NewRefreshToken, RefreshToken};
use warden_core::traits::{RepoResult, TokenStore};

use crate::models::RefreshTokenModel;

use super::error::map_db_error;

/// PostgreSQL implementation of TokenStore
#[derive(Clone)]
pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    /// Create a new PgTokenStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    #[instrument(skip(self, token), fields(user_id = %token.user_id))]
    async fn create_refresh_token(&self, token: NewRefreshToken) -> RepoResult<RefreshToken> {
        let record = token.into_record();

        let model = sqlx::query_as::<_, RefreshTokenModel>(
            r"
            INSERT INTO refresh_tokens (id, user_id, user_email, token, ip_address, user_agent,
                                        created_at, last_used_at, expires_at, is_revoked)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE)
            RETURNING id, user_id, user_email, token, ip_address, user_agent, created_at,
                      last_used_at, expires_at, is_revoked, revoked_reason
            ",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.user_email)
        .bind(&record.token)
        .bind(&record.ip_address)
        .bind(&record.user_agent)
        .bind(record.created_at)
        .bind(record.last_used_at)
        .bind(record.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(RefreshToken::from(model))
    }

    #[instrument(skip(self, token))]
    async fn find_active_by_value(&self, token: &str) -> RepoResult<Option<RefreshToken>> {
        let result = sqlx::query_as::<_, RefreshTokenModel>(
            r"
            SELECT id, user_id, user_email, token, ip_address, user_agent, created_at,
                   last_used_at, expires_at, is_revoked, revoked_reason
            FROM refresh_tokens
            WHERE token = $1 AND is_revoked = FALSE AND expires_at > NOW()
            LIMIT 1
            ",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(RefreshToken::from))
    }

    #[instrument(skip(self, token))]
    async fn revoke_by_value(&self, token: &str, reason: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_reason = $2
            WHERE token = $1 AND is_revoked = FALSE
            ",
        )
        .bind(token)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn revoke_all_for_user(&self, user_id: Uuid, reason: &str) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_reason = $2
            WHERE user_id = $1 AND is_revoked = FALSE
            ",
        )
        .bind(user_id)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self, token))]
    async fn touch_last_used(&self, token: &str) -> RepoResult<()> {
        sqlx::query(
            r"
            UPDATE refresh_tokens SET last_used_at = NOW() WHERE token = $1
            ",
        )
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn revoke_expired(&self) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET is_revoked = TRUE, revoked_reason = 'Token expired'
            WHERE expires_at < NOW() AND is_revoked = FALSE
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
