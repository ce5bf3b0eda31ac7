//! Domain entities for the access domain
//!
//! Value types shared by the resolver, router and token manager: privacy
//! levels as published by the host platform, the tri-state option flags the
//! settings store conflates into strings, and the access mode itself.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Capability required to see and change a space's access options.
///
/// Maps to the host platform's user-promotion capability: whoever may
/// change other members' roles may also manage how people get in.
pub const CAP_PROMOTE_USERS: &str = "promote_users";

/// Capability additionally required to enable self-registration.
pub const CAP_MANAGE_OPTIONS: &str = "manage_options";

/// Placeholder shown in place of the real invitation token while
/// self-registration is active, so a previously set access code is never
/// exposed through the settings surface.
pub const TOKEN_PLACEHOLDER: &str = "welcome";

/// Privacy level of a space, owned by the host platform.
///
/// The host stores this as an integer option: `-2` private, `-1`
/// community, anything else public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    Private,
    Community,
    Public,
}

impl PrivacyLevel {
    pub const PRIVATE_RAW: i64 = -2;
    pub const COMMUNITY_RAW: i64 = -1;

    /// Interpret the host's raw integer option value.
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            Self::PRIVATE_RAW => PrivacyLevel::Private,
            Self::COMMUNITY_RAW => PrivacyLevel::Community,
            _ => PrivacyLevel::Public,
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, PrivacyLevel::Private)
    }
}

impl std::fmt::Display for PrivacyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrivacyLevel::Private => write!(f, "private"),
            PrivacyLevel::Community => write!(f, "community"),
            PrivacyLevel::Public => write!(f, "public"),
        }
    }
}

/// Tri-state option flag.
///
/// The settings store cannot distinguish a stored boolean `false` from an
/// absent key, so explicit deactivation is stored as the sentinel `-1`
/// while truthy strings mean enabled. `Unset` (no key at all) is kept
/// distinct and resolves with a per-flag default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    #[default]
    Unset,
    Enabled,
    Disabled,
}

/// Stored string value for an enabled flag.
pub const TOGGLE_ON: &str = "1";
/// Stored sentinel for an explicitly deactivated flag.
pub const TOGGLE_OFF: &str = "-1";

impl Toggle {
    /// Translate the store's string representation into the tri-state.
    ///
    /// `None` (absent key) is `Unset`; the `-1` sentinel and other falsy
    /// strings are `Disabled`; truthy strings are `Enabled`.
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw {
            None => Toggle::Unset,
            Some(value) => {
                let value = value.trim();
                if value.eq_ignore_ascii_case("1")
                    || value.eq_ignore_ascii_case("true")
                    || value.eq_ignore_ascii_case("yes")
                    || value.eq_ignore_ascii_case("on")
                {
                    Toggle::Enabled
                } else {
                    Toggle::Disabled
                }
            }
        }
    }

    /// Whether the flag counts as enabled, given the default for `Unset`.
    pub fn is_enabled(&self, default_when_unset: bool) -> bool {
        match self {
            Toggle::Unset => default_when_unset,
            Toggle::Enabled => true,
            Toggle::Disabled => false,
        }
    }
}

/// The single active access mode of a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    None,
    InvitationLink,
    SelfRegistration,
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessMode::None => write!(f, "none"),
            AccessMode::InvitationLink => write!(f, "invitation_link"),
            AccessMode::SelfRegistration => write!(f, "self_registration"),
        }
    }
}

/// Error for unrecognized access mode names in request payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown access mode: {0}")]
pub struct UnknownAccessMode(pub String);

impl FromStr for AccessMode {
    type Err = UnknownAccessMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(AccessMode::None),
            "invitation_link" => Ok(AccessMode::InvitationLink),
            "self_registration" => Ok(AccessMode::SelfRegistration),
            other => Err(UnknownAccessMode(other.to_string())),
        }
    }
}

/// Per-space access configuration as read from the settings store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpaceAccessConfig {
    /// The invitation secret, if one has been generated or set.
    pub invitation_token: Option<String>,
    pub invitation_link_active: Toggle,
    pub self_registration: Toggle,
}

/// URL equality the way page routing needs it: compared with the query
/// string, fragment and trailing slashes stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparableUrl(String);

impl ComparableUrl {
    pub fn new(url: &str) -> Self {
        let without_query = url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        ComparableUrl(without_query.to_string())
    }

    pub fn equals(&self, other: &str) -> bool {
        *self == Self::new(other)
    }
}
