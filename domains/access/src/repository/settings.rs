//! Settings store boundary and typed facade
//!
//! The store is an external per-space key-value service. Boolean-like
//! options are stored as strings, with the `-1` sentinel meaning
//! "explicitly deactivated" as opposed to an absent key. All translation
//! between stored strings and domain types happens here, at the adapter
//! boundary.

use crate::domain::entities::{PrivacyLevel, SpaceAccessConfig, Toggle, TOGGLE_OFF, TOGGLE_ON};
use async_trait::async_trait;
use spacegate_common::{Error, Result};
use std::sync::Arc;
use uuid::Uuid;

/// Well-known option keys.
pub mod keys {
    pub const INVITATION_LINK: &str = "invitation_link";
    pub const INVITATION_LINK_ACTIVE: &str = "invitation_link_active";
    pub const SELF_REGISTRATION: &str = "self_registration";
    pub const BLOG_PUBLIC: &str = "blog_public";
    pub const DEFAULT_ROLE: &str = "default_role";
    pub const HOME: &str = "home";
}

/// Role assigned to joiners when the space has not configured one.
const FALLBACK_DEFAULT_ROLE: &str = "author";

/// Per-space key-value settings service, owned by the host platform.
///
/// Writes are single-key atomic on the store's side; this domain never
/// assumes exclusive access and tolerates concurrent external mutation.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, space: Uuid, key: &str) -> Result<Option<String>>;

    /// Returns whether the store accepted the write.
    async fn set(&self, space: Uuid, key: &str, value: &str) -> Result<bool>;
}

/// Typed facade over the raw settings store.
#[derive(Clone)]
pub struct SpaceSettings {
    store: Arc<dyn SettingsStore>,
}

impl SpaceSettings {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// The stored invitation secret. An empty stored string counts as
    /// absent: the store does not distinguish the two reliably.
    pub async fn invitation_token(&self, space: Uuid) -> Result<Option<String>> {
        Ok(self
            .store
            .get(space, keys::INVITATION_LINK)
            .await?
            .filter(|token| !token.is_empty()))
    }

    pub async fn set_invitation_token(&self, space: Uuid, token: &str) -> Result<bool> {
        self.store.set(space, keys::INVITATION_LINK, token).await
    }

    pub async fn access_config(&self, space: Uuid) -> Result<SpaceAccessConfig> {
        Ok(SpaceAccessConfig {
            invitation_token: self.invitation_token(space).await?,
            invitation_link_active: self.invitation_link_active(space).await?,
            self_registration: self.self_registration(space).await?,
        })
    }

    pub async fn invitation_link_active(&self, space: Uuid) -> Result<Toggle> {
        let raw = self.store.get(space, keys::INVITATION_LINK_ACTIVE).await?;
        Ok(Toggle::from_stored(raw.as_deref()))
    }

    pub async fn self_registration(&self, space: Uuid) -> Result<Toggle> {
        let raw = self.store.get(space, keys::SELF_REGISTRATION).await?;
        Ok(Toggle::from_stored(raw.as_deref()))
    }

    pub async fn set_invitation_link_active(&self, space: Uuid, on: bool) -> Result<bool> {
        let value = if on { TOGGLE_ON } else { TOGGLE_OFF };
        self.store
            .set(space, keys::INVITATION_LINK_ACTIVE, value)
            .await
    }

    pub async fn set_self_registration(&self, space: Uuid, on: bool) -> Result<bool> {
        let value = if on { TOGGLE_ON } else { TOGGLE_OFF };
        self.store.set(space, keys::SELF_REGISTRATION, value).await
    }

    /// The host's integer privacy option; absent or unparsable values fall
    /// back to public, matching the host's own default.
    pub async fn privacy_level(&self, space: Uuid) -> Result<PrivacyLevel> {
        let raw = self
            .store
            .get(space, keys::BLOG_PUBLIC)
            .await?
            .and_then(|value| value.trim().parse::<i64>().ok())
            .unwrap_or(1);
        Ok(PrivacyLevel::from_raw(raw))
    }

    pub async fn set_privacy_raw(&self, space: Uuid, raw: i64) -> Result<bool> {
        self.store
            .set(space, keys::BLOG_PUBLIC, &raw.to_string())
            .await
    }

    /// Role joiners receive via invitation or self-registration.
    pub async fn default_role(&self, space: Uuid) -> Result<String> {
        Ok(self
            .store
            .get(space, keys::DEFAULT_ROLE)
            .await?
            .filter(|role| !role.is_empty())
            .unwrap_or_else(|| FALLBACK_DEFAULT_ROLE.to_string()))
    }

    pub async fn home_url(&self, space: Uuid) -> Result<String> {
        self.store
            .get(space, keys::HOME)
            .await?
            .filter(|url| !url.is_empty())
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or_else(|| Error::NotFound(format!("Space {} has no home URL", space)))
    }

    pub async fn login_url(&self, space: Uuid) -> Result<String> {
        Ok(format!("{}/login", self.home_url(space).await?))
    }
}
