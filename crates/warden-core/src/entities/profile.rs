//! Profile entity and provider-supplied profile data

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::value_objects::AuthProvider;

/// Optional personal details attached 1:1 to an identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: Uuid,
    pub provider_id: Option<String>,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Empty profile created alongside a new identity
    pub fn empty(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            provider_id: None,
            display_name: None,
            first_name: None,
            last_name: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build the initial profile for an identity created from a provider
    pub fn from_provider(user_id: Uuid, data: &ProviderProfile) -> Self {
        Self {
            provider_id: Some(data.provider_id.clone()),
            display_name: data.display_name.clone(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            avatar_url: data.avatar_url.clone(),
            ..Self::empty(user_id)
        }
    }

    /// Link a provider, keeping fields the user already set
    pub fn link_provider(&mut self, data: &ProviderProfile) {
        self.provider_id = Some(data.provider_id.clone());
        if self.display_name.is_none() {
            self.display_name.clone_from(&data.display_name);
        }
        if self.avatar_url.is_none() {
            self.avatar_url.clone_from(&data.avatar_url);
        }
        self.updated_at = Utc::now();
    }
}

/// User information returned by an external identity provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider: AuthProvider,
    pub provider_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}
