//! Access domain: access modes, invitation tokens, request routing
//!
//! A space (one site within the multisite host) grants membership through
//! at most one of three access modes: an invitation link carrying a secret
//! token, open self-registration, or nothing at all. This crate owns the
//! decision logic — which mode is active, what a given page load should do,
//! and the invitation secret's lifecycle — while the settings store, the
//! membership directory and identity resolution stay host-owned
//! collaborators behind traits.

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{
    AccessMode, ComparableUrl, PrivacyLevel, SpaceAccessConfig, Toggle, CAP_MANAGE_OPTIONS,
    CAP_PROMOTE_USERS, TOKEN_PLACEHOLDER,
};
pub use domain::resolver::{AccessModeResolver, ModeChange};
pub use domain::router::{Decision, Mutation, Notice, NoticeKind, RequestContext, RequestRouter};
pub use domain::token::TokenManager;

// Re-export repository types
pub use repository::{
    actor_can, Identity, IdentityResolver, MembershipDirectory, MemoryIdentityResolver,
    MemoryMembershipDirectory, MemorySettingsStore, SettingsStore, SpaceSettings,
};

// Re-export API types
pub use api::nonce::NonceService;
pub use api::routes::routes;
pub use api::AccessState;
