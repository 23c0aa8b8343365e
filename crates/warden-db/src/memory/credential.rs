use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use warden_core::entities::{Identity, Profile, ProviderProfile};
use warden_core::error::DomainError;
use warden_core::traits::{CredentialStore, RepoResult};
use warden_core::value_objects::{AuthProvider, Role, UserStatus};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, Identity>,
    profiles: HashMap<Uuid, Profile>,
    permissions: HashMap<Uuid, BTreeSet<String>>,
}

/// CredentialStore kept in process memory
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    tables: RwLock<Tables>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change a stored role. Returns false if the identity does not exist.
    pub fn set_role(&self, id: Uuid, role: Role) -> bool {
        self.update(id, |identity| identity.role = role)
    }

    /// Change a stored status. Returns false if the identity does not exist.
    pub fn set_status(&self, id: Uuid, status: UserStatus) -> bool {
        self.update(id, |identity| identity.status = status)
    }

    fn update(&self, id: Uuid, apply: impl FnOnce(&mut Identity)) -> bool {
        let mut tables = self.tables.write();
        match tables.users.get_mut(&id) {
            Some(identity) => {
                apply(identity);
                identity.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    fn insert(tables: &mut Tables, identity: Identity, profile: Profile) -> RepoResult<()> {
        if tables.users.values().any(|u| u.email == identity.email) {
            return Err(DomainError::EmailAlreadyExists);
        }
        tables.profiles.insert(identity.id, profile);
        tables.users.insert(identity.id, identity);
        Ok(())
    }

    fn stamp_login(tables: &mut Tables, id: Uuid) -> RepoResult<Identity> {
        let identity = tables
            .users
            .get_mut(&id)
            .ok_or(DomainError::UserNotFound(id))?;
        let now = Utc::now();
        identity.last_login_at = Some(now);
        identity.updated_at = now;
        Ok(identity.clone())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Identity>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Identity>> {
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_provider_identity(
        &self,
        provider: AuthProvider,
        provider_id: &str,
    ) -> RepoResult<Option<Identity>> {
        let tables = self.tables.read();
        let found = tables
            .profiles
            .values()
            .filter(|p| p.provider_id.as_deref() == Some(provider_id))
            .filter_map(|p| tables.users.get(&p.user_id))
            .find(|u| u.auth_provider == provider)
            .cloned();
        Ok(found)
    }

    async fn create_user(&self, identity: &Identity) -> RepoResult<()> {
        let mut tables = self.tables.write();
        Self::insert(&mut tables, identity.clone(), Profile::empty(identity.id))
    }

    async fn find_or_create_from_provider(&self, data: &ProviderProfile) -> RepoResult<Identity> {
        if let Some(existing) = self
            .find_by_provider_identity(data.provider, &data.provider_id)
            .await?
        {
            return Self::stamp_login(&mut self.tables.write(), existing.id);
        }

        let mut tables = self.tables.write();
        let by_email = tables
            .users
            .values()
            .find(|u| u.email == data.email)
            .map(|u| u.id);

        let user_id = match by_email {
            Some(id) => {
                tables
                    .profiles
                    .entry(id)
                    .and_modify(|profile| profile.link_provider(data))
                    .or_insert_with(|| Profile::from_provider(id, data));
                id
            }
            None => {
                let identity = Identity::from_provider(&data.email, data.provider);
                let id = identity.id;
                Self::insert(&mut tables, identity, Profile::from_provider(id, data))?;
                id
            }
        };

        Self::stamp_login(&mut tables, user_id)
    }

    async fn update_last_login(&self, id: Uuid) -> RepoResult<()> {
        Self::stamp_login(&mut self.tables.write(), id).map(|_| ())
    }

    async fn find_profile_by_user_id(&self, user_id: Uuid) -> RepoResult<Option<Profile>> {
        Ok(self.tables.read().profiles.get(&user_id).cloned())
    }

    async fn list_permissions_by_user_id(&self, user_id: Uuid) -> RepoResult<Vec<String>> {
        Ok(self
            .tables
            .read()
            .permissions
            .get(&user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn grant_permission(&self, user_id: Uuid, permission: &str) -> RepoResult<()> {
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&user_id) {
            return Err(DomainError::UserNotFound(user_id));
        }
        tables
            .permissions
            .entry(user_id)
            .or_default()
            .insert(permission.to_string());
        Ok(())
    }
}
