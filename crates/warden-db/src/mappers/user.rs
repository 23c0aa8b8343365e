//! Identity and profile entity <-> model mappers

use warden_core::entities::{Identity, Profile};
use warden_core::error::DomainError;

use crate::models::{ProfileModel, UserModel};

fn corrupt(column: &str, err: impl std::fmt::Display) -> DomainError {
    DomainError::DatabaseError(format!("invalid {column} in users row: {err}"))
}

/// Convert UserModel to Identity entity. Enum columns are stored as text.
impl TryFrom<UserModel> for Identity {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        Ok(Identity {
            id: model.id,
            email: model.email,
            auth_provider: model
                .auth_provider
                .parse()
                .map_err(|e| corrupt("auth_provider", e))?,
            hashed_password: model.hashed_password,
            role: model.role.parse().map_err(|e| corrupt("role", e))?,
            status: model.status.parse().map_err(|e| corrupt("status", e))?,
            email_verified: model.email_verified,
            created_at: model.created_at,
            last_login_at: model.last_login_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<ProfileModel> for Profile {
    fn from(model: ProfileModel) -> Self {
        Profile {
            user_id: model.user_id,
            provider_id: model.provider_id,
            display_name: model.display_name,
            first_name: model.first_name,
            last_name: model.last_name,
            avatar_url: model.avatar_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
