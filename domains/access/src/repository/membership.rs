//! Membership directory boundary
//!
//! The host platform owns users, roles and memberships. The access domain
//! only reads membership state and requests mutations.

use crate::repository::identity::Identity;
use async_trait::async_trait;
use spacegate_common::Result;
use std::collections::HashSet;
use uuid::Uuid;

/// User/membership directory of the host platform.
#[async_trait]
pub trait MembershipDirectory: Send + Sync {
    async fn is_member(&self, space: Uuid, user: Uuid) -> Result<bool>;

    /// Add the user to the space with the given role. Re-adding an
    /// existing member with a different role supersedes the old role;
    /// this is also the upgrade path.
    async fn add_member(&self, space: Uuid, user: Uuid, role: &str) -> Result<()>;

    async fn remove_member(&self, space: Uuid, user: Uuid) -> Result<()>;

    /// All users whose role in the space grants the capability.
    async fn users_with_capability(&self, space: Uuid, capability: &str) -> Result<Vec<Uuid>>;

    /// Capabilities granted by a role, as configured for the space.
    async fn role_capabilities(&self, space: Uuid, role: &str) -> Result<HashSet<String>>;

    /// Capabilities the user's current role in the space grants. Empty for
    /// non-members.
    async fn user_capabilities(&self, space: Uuid, user: Uuid) -> Result<HashSet<String>>;
}

/// Check a capability the way the host platform would: super-admins pass
/// every check, everyone else needs the capability from their role in the
/// space.
pub async fn actor_can(
    members: &dyn MembershipDirectory,
    space: Uuid,
    actor: &Identity,
    capability: &str,
) -> Result<bool> {
    if actor.super_admin {
        return Ok(true);
    }
    let caps = members.user_capabilities(space, actor.user_id).await?;
    Ok(caps.contains(capability))
}
