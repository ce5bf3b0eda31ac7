//! Route definitions for the access domain API

use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{options, pages, privacy, token};
use super::middleware::AccessState;

/// Space page routes: where per-request routing happens
fn page_routes() -> Router<AccessState> {
    Router::new()
        .route("/v1/spaces/{space_id}/home", get(pages::space_home))
        .route("/v1/spaces/{space_id}/login", get(pages::space_login))
}

/// Access option management routes
fn option_routes() -> Router<AccessState> {
    Router::new()
        .route(
            "/v1/spaces/{space_id}/access/mode",
            post(options::change_access_mode),
        )
        .route(
            "/v1/spaces/{space_id}/access/options",
            get(options::access_options),
        )
        .route(
            "/v1/spaces/{space_id}/access/nonces",
            get(options::access_nonces),
        )
}

/// Invitation token routes
fn token_routes() -> Router<AccessState> {
    Router::new()
        .route(
            "/v1/spaces/{space_id}/access/token",
            post(token::update_token),
        )
        .route(
            "/v1/spaces/{space_id}/access/link",
            get(token::invitation_link),
        )
}

/// Host platform integration routes
fn privacy_routes() -> Router<AccessState> {
    Router::new().route("/v1/spaces/{space_id}/privacy", put(privacy::update_privacy))
}

/// Create all access domain API routes
pub fn routes() -> Router<AccessState> {
    Router::new()
        .merge(page_routes())
        .merge(option_routes())
        .merge(token_routes())
        .merge(privacy_routes())
}
