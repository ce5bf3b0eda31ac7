//! Collaborator boundaries for the access domain
//!
//! The settings store, membership directory and identity resolver are
//! owned by the host platform. This module defines the traits the domain
//! consumes, typed facades over them, and in-memory implementations used
//! by the composition root and tests.

pub mod identity;
pub mod membership;
pub mod memory;
pub mod settings;

pub use identity::{Identity, IdentityResolver};
pub use membership::{actor_can, MembershipDirectory};
pub use memory::{MemoryIdentityResolver, MemoryMembershipDirectory, MemorySettingsStore};
pub use settings::{keys, SettingsStore, SpaceSettings};
