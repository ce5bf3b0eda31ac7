//! API layer for the access domain
//!
//! Contains HTTP handlers, routes, nonce service, and domain state
//! definition.

pub mod handlers;
pub mod middleware;
pub mod nonce;
pub mod routes;

pub use middleware::AccessState;
pub use routes::routes;
