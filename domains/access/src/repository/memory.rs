//! In-memory collaborator implementations
//!
//! Used by the composition root when no host platform is attached, and by
//! tests. Role definitions mirror the host's defaults closely enough for
//! capability checks: administrators can promote users and manage
//! options, authors can publish, subscribers can read.

use crate::repository::identity::{Identity, IdentityResolver};
use crate::repository::membership::MembershipDirectory;
use crate::repository::settings::{keys, SettingsStore};
use async_trait::async_trait;
use spacegate_common::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use uuid::Uuid;

fn lock_poisoned() -> Error {
    Error::Internal("in-memory store lock poisoned".to_string())
}

/// In-memory per-space key-value settings store.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: RwLock<HashMap<(Uuid, String), String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a space with a home URL, the one option every space has.
    pub fn seed_space(&self, space: Uuid, home_url: &str) {
        if let Ok(mut values) = self.values.write() {
            values.insert((space, keys::HOME.to_string()), home_url.to_string());
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, space: Uuid, key: &str) -> Result<Option<String>> {
        let values = self.values.read().map_err(|_| lock_poisoned())?;
        Ok(values.get(&(space, key.to_string())).cloned())
    }

    async fn set(&self, space: Uuid, key: &str, value: &str) -> Result<bool> {
        let mut values = self.values.write().map_err(|_| lock_poisoned())?;
        values.insert((space, key.to_string()), value.to_string());
        Ok(true)
    }
}

/// In-memory membership directory with a global role table.
pub struct MemoryMembershipDirectory {
    roles: RwLock<HashMap<String, HashSet<String>>>,
    members: RwLock<HashMap<(Uuid, Uuid), String>>,
}

impl MemoryMembershipDirectory {
    pub fn new() -> Self {
        Self {
            roles: RwLock::new(HashMap::new()),
            members: RwLock::new(HashMap::new()),
        }
    }

    /// A directory pre-populated with the host's standard roles.
    pub fn with_default_roles() -> Self {
        let directory = Self::new();
        directory.define_role(
            "administrator",
            &["read", "edit_posts", "publish_posts", "promote_users", "manage_options"],
        );
        directory.define_role("author", &["read", "edit_posts", "publish_posts"]);
        directory.define_role("subscriber", &["read"]);
        directory
    }

    pub fn define_role(&self, role: &str, capabilities: &[&str]) {
        if let Ok(mut roles) = self.roles.write() {
            roles.insert(
                role.to_string(),
                capabilities.iter().map(|cap| cap.to_string()).collect(),
            );
        }
    }
}

impl Default for MemoryMembershipDirectory {
    fn default() -> Self {
        Self::with_default_roles()
    }
}

#[async_trait]
impl MembershipDirectory for MemoryMembershipDirectory {
    async fn is_member(&self, space: Uuid, user: Uuid) -> Result<bool> {
        let members = self.members.read().map_err(|_| lock_poisoned())?;
        Ok(members.contains_key(&(space, user)))
    }

    async fn add_member(&self, space: Uuid, user: Uuid, role: &str) -> Result<()> {
        let mut members = self.members.write().map_err(|_| lock_poisoned())?;
        members.insert((space, user), role.to_string());
        Ok(())
    }

    async fn remove_member(&self, space: Uuid, user: Uuid) -> Result<()> {
        let mut members = self.members.write().map_err(|_| lock_poisoned())?;
        members.remove(&(space, user));
        Ok(())
    }

    async fn users_with_capability(&self, space: Uuid, capability: &str) -> Result<Vec<Uuid>> {
        let members = self.members.read().map_err(|_| lock_poisoned())?;
        let roles = self.roles.read().map_err(|_| lock_poisoned())?;
        let mut users: Vec<Uuid> = members
            .iter()
            .filter(|((member_space, _), role)| {
                *member_space == space
                    && roles
                        .get(*role)
                        .is_some_and(|caps| caps.contains(capability))
            })
            .map(|((_, user), _)| *user)
            .collect();
        users.sort();
        Ok(users)
    }

    async fn role_capabilities(&self, _space: Uuid, role: &str) -> Result<HashSet<String>> {
        let roles = self.roles.read().map_err(|_| lock_poisoned())?;
        Ok(roles.get(role).cloned().unwrap_or_default())
    }

    async fn user_capabilities(&self, space: Uuid, user: Uuid) -> Result<HashSet<String>> {
        let role = {
            let members = self.members.read().map_err(|_| lock_poisoned())?;
            members.get(&(space, user)).cloned()
        };
        match role {
            Some(role) => self.role_capabilities(space, &role).await,
            None => Ok(HashSet::new()),
        }
    }
}

/// In-memory session-token registry.
#[derive(Default)]
pub struct MemoryIdentityResolver {
    sessions: RwLock<HashMap<String, Identity>>,
}

impl MemoryIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_session(&self, token: &str, identity: Identity) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(token.to_string(), identity);
        }
    }
}

#[async_trait]
impl IdentityResolver for MemoryIdentityResolver {
    async fn resolve(&self, session_token: &str) -> Result<Option<Identity>> {
        let sessions = self.sessions.read().map_err(|_| lock_poisoned())?;
        Ok(sessions.get(session_token).copied())
    }
}
