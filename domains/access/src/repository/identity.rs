//! Identity resolution boundary
//!
//! Authentication is host-owned: a request carries an opaque session
//! token, and the host tells us who that is and whether they are a
//! network-wide super-admin.

use async_trait::async_trait;
use spacegate_common::Result;
use uuid::Uuid;

/// An authenticated user, as resolved by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub super_admin: bool,
}

/// Resolves opaque session tokens to identities.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `None` means the token is unknown or expired — the request is
    /// treated as anonymous, never as an error.
    async fn resolve(&self, session_token: &str) -> Result<Option<Identity>>;
}
