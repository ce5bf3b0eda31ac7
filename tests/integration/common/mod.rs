//! Common test utilities and fixtures for integration tests
//!
//! Provides a fully wired in-memory application: settings store,
//! membership directory, identity resolver and the composed axum router,
//! plus helpers for sessions, nonces and request building.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use spacegate_access::{
    AccessState, Identity, MembershipDirectory, MemoryIdentityResolver,
    MemoryMembershipDirectory, MemorySettingsStore,
};

pub const HOME: &str = "https://example.org/space";

/// Test application with in-memory collaborators
pub struct TestApp {
    pub router: Router,
    pub state: AccessState,
    pub store: Arc<MemorySettingsStore>,
    pub members: Arc<MemoryMembershipDirectory>,
    pub identity: Arc<MemoryIdentityResolver>,
    pub space: Uuid,
}

impl TestApp {
    /// One seeded space, empty membership, no sessions.
    pub fn new() -> Self {
        let store = Arc::new(MemorySettingsStore::new());
        let members = Arc::new(MemoryMembershipDirectory::with_default_roles());
        let identity = Arc::new(MemoryIdentityResolver::new());

        let space = Uuid::new_v4();
        store.seed_space(space, HOME);

        let state = AccessState::new(
            store.clone(),
            members.clone(),
            identity.clone(),
            "integration-test-secret",
        );
        let router = spacegate_access::routes().with_state(state.clone());

        Self {
            router,
            state,
            store,
            members,
            identity,
            space,
        }
    }

    /// Register a session token for a fresh user and return the identity.
    pub fn session(&self, token: &str, super_admin: bool) -> Identity {
        let identity = Identity {
            user_id: Uuid::new_v4(),
            super_admin,
        };
        self.identity.register_session(token, identity);
        identity
    }

    /// Register a session and add the user to the space with a role.
    pub async fn member_session(&self, token: &str, role: &str) -> Identity {
        let identity = self.session(token, false);
        self.members
            .add_member(self.space, identity.user_id, role)
            .await
            .unwrap();
        identity
    }

    pub fn nonce(&self, user: Uuid, action: &str) -> String {
        self.state.nonces.issue(user, action)
    }

    pub async fn is_member(&self, user: Uuid) -> bool {
        self.members.is_member(self.space, user).await.unwrap()
    }

    /// GET a space-relative path, optionally authenticated.
    pub async fn get(&self, path_and_query: &str, bearer: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method(Method::GET)
            .uri(format!("/v1/spaces/{}{}", self.space, path_and_query));
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = builder.body(Body::empty()).unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Send a JSON write request with bearer auth and an optional nonce.
    pub async fn send_json(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        nonce: Option<&str>,
        body: Value,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("/v1/spaces/{}{}", self.space, path))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(nonce) = nonce {
            builder = builder.header("x-spacegate-nonce", nonce);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert a redirect and return its target.
pub fn redirect_target(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without location header")
        .to_str()
        .unwrap()
        .to_string()
}
