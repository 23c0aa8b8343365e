//! PostgreSQL implementation of CredentialStore

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

use warden_core::entities::{Identity, Profile, ProviderProfile};
use warden_core::error::DomainError;
use warden_core::traits::{CredentialStore, RepoResult};
use warden_core::value_objects::AuthProvider;

use crate::models::{ProfileModel, UserModel};

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of CredentialStore
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Create a new PgCredentialStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_user(tx: &mut Transaction<'_, Postgres>, identity: &Identity) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, auth_provider, hashed_password, role, status,
                               email_verified, created_at, last_login_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(identity.id)
        .bind(&identity.email)
        .bind(identity.auth_provider.as_str())
        .bind(identity.hashed_password.as_deref())
        .bind(identity.role.as_str())
        .bind(identity.status.as_str())
        .bind(identity.email_verified)
        .bind(identity.created_at)
        .bind(identity.last_login_at)
        .bind(identity.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::EmailAlreadyExists))?;

        Ok(())
    }

    /// Insert a profile, or link a provider onto an existing one without
    /// overwriting display name or avatar the user already has
    async fn upsert_profile(tx: &mut Transaction<'_, Postgres>, profile: &Profile) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO user_profiles (user_id, provider_id, display_name, first_name, last_name,
                                       avatar_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE SET
                provider_id  = EXCLUDED.provider_id,
                display_name = COALESCE(user_profiles.display_name, EXCLUDED.display_name),
                avatar_url   = COALESCE(user_profiles.avatar_url, EXCLUDED.avatar_url),
                updated_at   = NOW()
            ",
        )
        .bind(profile.user_id)
        .bind(profile.provider_id.as_deref())
        .bind(profile.display_name.as_deref())
        .bind(profile.first_name.as_deref())
        .bind(profile.last_name.as_deref())
        .bind(profile.avatar_url.as_deref())
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    /// Stamp last login and return the fresh row
    async fn touch_login(&self, id: Uuid) -> RepoResult<Identity> {
        let model = sqlx::query_as::<_, UserModel>(
            r"
            UPDATE users
            SET last_login_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, auth_provider, hashed_password, role, status, email_verified,
                      created_at, last_login_at, updated_at
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or(DomainError::UserNotFound(id))?;

        Identity::try_from(model)
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Identity>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, email, auth_provider, hashed_password, role, status, email_verified,
                   created_at, last_login_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Identity::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Identity>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT id, email, auth_provider, hashed_password, role, status, email_verified,
                   created_at, last_login_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Identity::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_provider_identity(
        &self,
        provider: AuthProvider,
        provider_id: &str,
    ) -> RepoResult<Option<Identity>> {
        let result = sqlx::query_as::<_, UserModel>(
            r"
            SELECT u.id, u.email, u.auth_provider, u.hashed_password, u.role, u.status,
                   u.email_verified, u.created_at, u.last_login_at, u.updated_at
            FROM users u
            JOIN user_profiles p ON p.user_id = u.id
            WHERE p.provider_id = $1 AND u.auth_provider = $2
            LIMIT 1
            ",
        )
        .bind(provider_id)
        .bind(provider.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Identity::try_from).transpose()
    }

    #[instrument(skip(self, identity), fields(user_id = %identity.id))]
    async fn create_user(&self, identity: &Identity) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        Self::insert_user(&mut tx, identity).await?;
        Self::upsert_profile(&mut tx, &Profile::empty(identity.id)).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, data), fields(provider = %data.provider))]
    async fn find_or_create_from_provider(&self, data: &ProviderProfile) -> RepoResult<Identity> {
        if let Some(existing) = self
            .find_by_provider_identity(data.provider, &data.provider_id)
            .await?
        {
            return self.touch_login(existing.id).await;
        }

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let by_email = sqlx::query_scalar::<_, Uuid>(
            r"
            SELECT id FROM users WHERE email = $1 FOR UPDATE
            ",
        )
        .bind(&data.email)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let user_id = match by_email {
            Some(id) => {
                Self::upsert_profile(&mut tx, &Profile::from_provider(id, data)).await?;
                tracing::info!(user_id = %id, "Linked provider to existing account");
                id
            }
            None => {
                let identity = Identity::from_provider(&data.email, data.provider);
                Self::insert_user(&mut tx, &identity).await?;
                Self::upsert_profile(&mut tx, &Profile::from_provider(identity.id, data)).await?;
                tracing::info!(user_id = %identity.id, "Created account from provider");
                identity.id
            }
        };

        tx.commit().await.map_err(map_db_error)?;
        self.touch_login(user_id).await
    }

    #[instrument(skip(self))]
    async fn update_last_login(&self, id: Uuid) -> RepoResult<()> {
        self.touch_login(id).await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn find_profile_by_user_id(&self, user_id: Uuid) -> RepoResult<Option<Profile>> {
        let result = sqlx::query_as::<_, ProfileModel>(
            r"
            SELECT user_id, provider_id, display_name, first_name, last_name, avatar_url,
                   created_at, updated_at
            FROM user_profiles
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Profile::from))
    }

    #[instrument(skip(self))]
    async fn list_permissions_by_user_id(&self, user_id: Uuid) -> RepoResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r"
            SELECT p.name
            FROM permissions p
            JOIN user_permissions up ON up.permission_id = p.id
            WHERE up.user_id = $1
            ORDER BY p.name
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn grant_permission(&self, user_id: Uuid, permission: &str) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO permissions (name) VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            ",
        )
        .bind(permission)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO user_permissions (user_id, permission_id)
            SELECT $1, id FROM permissions WHERE name = $2
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(permission)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }
}
