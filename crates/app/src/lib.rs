//! Spacegate application composition root
//!
//! Composes the access domain router with shared infrastructure routes.
//! The collaborators (settings store, membership directory, identity
//! resolver) are in-memory here; a deployment against a real host
//! platform swaps them for adapters to its services.

use axum::Router;
use spacegate_access::{
    AccessState, MemoryIdentityResolver, MemoryMembershipDirectory, MemorySettingsStore,
};
use spacegate_common::Config;
use std::sync::Arc;

/// Everything the composition root wires together. The collaborator
/// handles stay reachable so the binary (and tests) can seed spaces,
/// members and sessions.
pub struct App {
    pub router: Router,
    pub store: Arc<MemorySettingsStore>,
    pub members: Arc<MemoryMembershipDirectory>,
    pub identity: Arc<MemoryIdentityResolver>,
}

/// Create the main application router with all routes and middleware
pub fn create_app(config: &Config) -> App {
    let store = Arc::new(MemorySettingsStore::new());
    let members = Arc::new(MemoryMembershipDirectory::with_default_roles());
    let identity = Arc::new(MemoryIdentityResolver::new());

    let state = AccessState::new(
        store.clone(),
        members.clone(),
        identity.clone(),
        &config.nonce_secret,
    );

    let router = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route("/", axum::routing::get(|| async { "Spacegate API v0.1.0" }))
        .merge(spacegate_access::routes().with_state(state));

    App {
        router,
        store,
        members,
        identity,
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
