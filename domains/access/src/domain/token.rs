//! Invitation token lifecycle
//!
//! Each space carries one opaque secret. Appending it to the space's home
//! URL as `?invitation_link=<token>` produces the shareable invitation
//! link; the same value doubles as the access code typed into the join
//! form. The token is generated lazily on first use and stays stable
//! until a manager rotates it.

use crate::domain::entities::{AccessMode, CAP_PROMOTE_USERS, TOKEN_PLACEHOLDER};
use crate::repository::identity::Identity;
use crate::repository::membership::{actor_can, MembershipDirectory};
use crate::repository::settings::SpaceSettings;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use spacegate_common::{Error, Result};
use std::sync::Arc;
use uuid::Uuid;

/// Query parameter carrying the token on invitation links.
pub const INVITATION_LINK_PARAM: &str = "invitation_link";

#[derive(Clone)]
pub struct TokenManager {
    settings: SpaceSettings,
    members: Arc<dyn MembershipDirectory>,
}

impl TokenManager {
    pub fn new(settings: SpaceSettings, members: Arc<dyn MembershipDirectory>) -> Self {
        Self { settings, members }
    }

    /// The space's invitation token, generating and persisting one if none
    /// is stored yet.
    ///
    /// The fresh token is written before the final read so two concurrent
    /// generators converge: the loser's read-back returns the winner's
    /// value.
    pub async fn get_token(&self, space: Uuid) -> Result<String> {
        if let Some(token) = self.settings.invitation_token(space).await? {
            return Ok(token);
        }

        let fresh = generate_token()?;
        self.settings.set_invitation_token(space, &fresh).await?;

        self.settings
            .invitation_token(space)
            .await?
            .ok_or_else(|| Error::Store("invitation token missing after write".to_string()))
    }

    /// Replace the token with a caller-chosen value.
    ///
    /// Requires the manager capability and a non-empty replacement. The
    /// stored token is overwritten unconditionally; no uniqueness check
    /// against other spaces. Returns the new full invitation link.
    pub async fn rotate_token(
        &self,
        space: Uuid,
        actor: &Identity,
        new_token: &str,
    ) -> Result<String> {
        if !actor_can(self.members.as_ref(), space, actor, CAP_PROMOTE_USERS).await? {
            return Err(Error::Authorization(
                "You are not allowed to change the invitation token".to_string(),
            ));
        }
        if new_token.is_empty() {
            return Err(Error::Validation("Token is missing".to_string()));
        }

        self.settings.set_invitation_token(space, new_token).await?;

        let home_url = self.settings.home_url(space).await?;
        Ok(invitation_url(&home_url, new_token))
    }

    /// The shareable invitation link for the space.
    pub async fn full_link(&self, space: Uuid) -> Result<String> {
        let home_url = self.settings.home_url(space).await?;
        let token = self.get_token(space).await?;
        Ok(invitation_url(&home_url, &token))
    }

    /// The link shown on the settings surface. While self-registration is
    /// the active mode the real secret is replaced with a placeholder, so
    /// a previously set access code is not exposed.
    pub async fn display_link(&self, space: Uuid, mode: AccessMode) -> Result<String> {
        if mode == AccessMode::SelfRegistration {
            let home_url = self.settings.home_url(space).await?;
            return Ok(invitation_url(&home_url, TOKEN_PLACEHOLDER));
        }
        self.full_link(space).await
    }
}

fn invitation_url(home_url: &str, token: &str) -> String {
    format!("{}?{}={}", home_url, INVITATION_LINK_PARAM, token)
}

/// An unguessable, URL-safe opaque token.
fn generate_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| Error::Internal(format!("Failed to generate random bytes: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
