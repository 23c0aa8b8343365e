//! Login view - the merged identity + profile + permissions shape

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Identity, Profile};
use crate::value_objects::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
    pub email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserView {
    /// Merge an identity with its (possibly missing) profile
    pub fn new(identity: &Identity, profile: Option<&Profile>) -> Self {
        Self {
            id: identity.id,
            role: identity.role,
            email: identity.email.clone(),
            email_verified: identity.email_verified,
            display_name: profile.and_then(|p| p.display_name.clone()),
            avatar_url: profile.and_then(|p| p.avatar_url.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginView {
    pub user: UserView,
    pub permissions: Vec<String>,
}
