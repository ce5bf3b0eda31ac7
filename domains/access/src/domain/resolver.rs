//! Active-mode resolution and option consistency
//!
//! A space has at most one active access mode. Self-registration, when
//! enabled, dominates the invitation link; a private space can never have
//! self-registration. The stored flags may disagree with the privacy
//! level (they are written by different actors), so the policy invariant
//! is re-applied on every resolve instead of trusting the flags alone.

use crate::domain::entities::{
    AccessMode, PrivacyLevel, SpaceAccessConfig, Toggle, CAP_MANAGE_OPTIONS, CAP_PROMOTE_USERS,
    TOGGLE_OFF, TOGGLE_ON,
};
use crate::repository::identity::Identity;
use crate::repository::membership::{actor_can, MembershipDirectory};
use crate::repository::settings::SpaceSettings;
use serde::Serialize;
use spacegate_common::{Error, Result};
use std::sync::Arc;
use uuid::Uuid;

/// Result of a mode change, reported back to the caller with the stored
/// flag values as the store now holds them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeChange {
    pub option_name: AccessMode,
    pub invitation_link_active: String,
    pub self_registration: String,
}

#[derive(Clone)]
pub struct AccessModeResolver {
    settings: SpaceSettings,
    members: Arc<dyn MembershipDirectory>,
}

impl AccessModeResolver {
    pub fn new(settings: SpaceSettings, members: Arc<dyn MembershipDirectory>) -> Self {
        Self { settings, members }
    }

    /// Compute the single active mode from stored flags and privacy level.
    ///
    /// Unset flags count as enabled — the store only ever holds the `-1`
    /// sentinel once someone explicitly deactivated an option, and a
    /// never-touched space behaves as open as its privacy level allows.
    pub fn resolve_active_mode(config: &SpaceAccessConfig, privacy: PrivacyLevel) -> AccessMode {
        let self_registration =
            config.self_registration.is_enabled(true) && !privacy.is_private();
        if self_registration {
            return AccessMode::SelfRegistration;
        }
        if config.invitation_link_active.is_enabled(true) {
            return AccessMode::InvitationLink;
        }
        AccessMode::None
    }

    /// Options the settings surface must not offer for this privacy level.
    pub fn disabled_options(privacy: PrivacyLevel) -> &'static [AccessMode] {
        if privacy.is_private() {
            &[AccessMode::SelfRegistration]
        } else {
            &[]
        }
    }

    /// The currently active mode of a space.
    pub async fn active_mode(&self, space: Uuid) -> Result<AccessMode> {
        let config = self.settings.access_config(space).await?;
        let privacy = self.settings.privacy_level(space).await?;
        Ok(Self::resolve_active_mode(&config, privacy))
    }

    /// Whether the actor may see and change the space's access options.
    pub async fn can_change_invitation_options(
        &self,
        space: Uuid,
        actor: &Identity,
    ) -> Result<bool> {
        actor_can(self.members.as_ref(), space, actor, CAP_PROMOTE_USERS).await
    }

    /// Whether the actor may enable self-registration: never on a private
    /// space, and only for space managers or super-admins.
    pub async fn can_change_self_registration(
        &self,
        space: Uuid,
        actor: &Identity,
    ) -> Result<bool> {
        if self.settings.privacy_level(space).await?.is_private() {
            return Ok(false);
        }
        Ok(actor.super_admin
            || actor_can(self.members.as_ref(), space, actor, CAP_MANAGE_OPTIONS).await?)
    }

    /// Persist a radio-exclusive mode choice.
    ///
    /// The two flags are always written together so the store never holds
    /// an ambiguous combination:
    /// - `none` deactivates both,
    /// - `invitation_link` activates the link and deactivates
    ///   self-registration,
    /// - `self_registration` activates both (the link stays usable while
    ///   self-registration dominates).
    pub async fn set_active_mode(
        &self,
        space: Uuid,
        mode: AccessMode,
        actor: &Identity,
    ) -> Result<ModeChange> {
        if !self.can_change_invitation_options(space, actor).await? {
            return Err(Error::Authorization(
                "You are not allowed to change access options".to_string(),
            ));
        }

        match mode {
            AccessMode::None => {
                self.settings.set_invitation_link_active(space, false).await?;
                self.settings.set_self_registration(space, false).await?;
            }
            AccessMode::InvitationLink => {
                self.settings.set_invitation_link_active(space, true).await?;
                self.settings.set_self_registration(space, false).await?;
            }
            AccessMode::SelfRegistration => {
                if !self.can_change_self_registration(space, actor).await? {
                    return Err(Error::Authorization(
                        "You are not allowed to enable self-registration".to_string(),
                    ));
                }
                self.settings.set_invitation_link_active(space, true).await?;
                self.settings.set_self_registration(space, true).await?;
            }
        }

        // Report the values as the store now holds them.
        let config = self.settings.access_config(space).await?;
        Ok(ModeChange {
            option_name: mode,
            invitation_link_active: stored_flag(config.invitation_link_active),
            self_registration: stored_flag(config.self_registration),
        })
    }

    /// React to a privacy-level change on the space.
    ///
    /// When a space turns private while self-registration is enabled, both
    /// self-registration and the invitation link are force-deactivated.
    /// The writes are best-effort: failures are logged and not retried.
    pub async fn on_privacy_changed(
        &self,
        space: Uuid,
        _old_level: PrivacyLevel,
        new_level: PrivacyLevel,
    ) {
        if !new_level.is_private() {
            return;
        }

        let self_registration = match self.settings.self_registration(space).await {
            Ok(flag) => flag,
            Err(error) => {
                tracing::warn!(%space, %error, "privacy cascade: could not read self-registration flag");
                return;
            }
        };
        if !self_registration.is_enabled(true) {
            return;
        }

        if let Err(error) = self.settings.set_self_registration(space, false).await {
            tracing::warn!(%space, %error, "privacy cascade: could not deactivate self-registration");
        }
        if let Err(error) = self.settings.set_invitation_link_active(space, false).await {
            tracing::warn!(%space, %error, "privacy cascade: could not deactivate invitation link");
        }
    }
}

fn stored_flag(toggle: Toggle) -> String {
    match toggle {
        Toggle::Enabled => TOGGLE_ON.to_string(),
        Toggle::Disabled => TOGGLE_OFF.to_string(),
        Toggle::Unset => String::new(),
    }
}
