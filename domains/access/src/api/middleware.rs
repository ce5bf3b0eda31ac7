//! Access domain state and request extractors

use crate::api::nonce::NonceService;
use crate::domain::resolver::AccessModeResolver;
use crate::domain::router::RequestRouter;
use crate::domain::token::TokenManager;
use crate::repository::identity::{Identity, IdentityResolver};
use crate::repository::membership::MembershipDirectory;
use crate::repository::settings::{SettingsStore, SpaceSettings};
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use spacegate_common::{Error, Result};
use std::sync::Arc;

/// Header carrying the per-action anti-forgery nonce on write requests.
pub const NONCE_HEADER: &str = "x-spacegate-nonce";

/// Application state for the access domain
#[derive(Clone)]
pub struct AccessState {
    pub settings: SpaceSettings,
    pub members: Arc<dyn MembershipDirectory>,
    pub identity: Arc<dyn IdentityResolver>,
    pub resolver: AccessModeResolver,
    pub tokens: TokenManager,
    pub router: RequestRouter,
    pub nonces: NonceService,
}

impl AccessState {
    /// Wire the domain services around the injected collaborators.
    pub fn new(
        store: Arc<dyn SettingsStore>,
        members: Arc<dyn MembershipDirectory>,
        identity: Arc<dyn IdentityResolver>,
        nonce_secret: &str,
    ) -> Self {
        let settings = SpaceSettings::new(store);
        let resolver = AccessModeResolver::new(settings.clone(), members.clone());
        let tokens = TokenManager::new(settings.clone(), members.clone());
        let router = RequestRouter::new(
            settings.clone(),
            resolver.clone(),
            tokens.clone(),
            members.clone(),
        );
        Self {
            settings,
            members,
            identity,
            resolver,
            tokens,
            router,
            nonces: NonceService::new(nonce_secret),
        }
    }

    /// Enforce the per-action nonce on a write request.
    pub fn require_nonce(&self, actor: &Identity, action: &str, headers: &HeaderMap) -> Result<()> {
        let nonce = headers
            .get(NONCE_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        if !self.nonces.verify(actor.user_id, action, nonce) {
            return Err(Error::Authorization("Invalid or missing nonce".to_string()));
        }
        Ok(())
    }
}

async fn resolve_bearer(parts: &Parts, state: &AccessState) -> Result<Option<Identity>> {
    let Some(authorization) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let token = authorization
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| Error::Authentication("Malformed authorization header".to_string()))?;
    state.identity.resolve(token).await
}

/// Extractor for the authenticated actor. Rejects anonymous requests.
pub struct Actor(pub Identity);

impl FromRequestParts<AccessState> for Actor {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AccessState,
    ) -> Result<Self> {
        match resolve_bearer(parts, state).await? {
            Some(identity) => Ok(Actor(identity)),
            None => Err(Error::Authentication(
                "Authentication required".to_string(),
            )),
        }
    }
}

/// Extractor for page routes, which serve anonymous visitors too.
pub struct MaybeActor(pub Option<Identity>);

impl FromRequestParts<AccessState> for MaybeActor {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AccessState,
    ) -> Result<Self> {
        Ok(MaybeActor(resolve_bearer(parts, state).await?))
    }
}
