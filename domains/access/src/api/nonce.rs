//! Per-action anti-forgery nonces
//!
//! Every state-changing endpoint requires a nonce bound to the acting
//! user and the action name. Nonces are derived, not stored:
//! `hex(sha256(secret ‖ user ‖ action ‖ tick))` with a coarse time tick,
//! verified against the current and the previous tick so a nonce stays
//! valid for at least half a tick window.

use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Action names the write endpoints are bound to.
pub mod actions {
    pub const CHANGE_INVITATION_OPTION: &str = "change_invitation_option";
    pub const UPDATE_TOKEN: &str = "invitation_update_token";
    pub const UPDATE_PRIVACY: &str = "update_privacy";
}

/// Seconds per nonce tick window.
const TICK_SECONDS: i64 = 12 * 60 * 60;

#[derive(Clone)]
pub struct NonceService {
    secret: String,
}

impl NonceService {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Issue a nonce for the user and action, valid for the current tick
    /// window and the next half window.
    pub fn issue(&self, user: Uuid, action: &str) -> String {
        self.derive(user, action, current_tick())
    }

    /// Verify a nonce against the current and the previous tick.
    pub fn verify(&self, user: Uuid, action: &str, nonce: &str) -> bool {
        let tick = current_tick();
        constant_time_eq(nonce, &self.derive(user, action, tick))
            || constant_time_eq(nonce, &self.derive(user, action, tick - 1))
    }

    fn derive(&self, user: Uuid, action: &str, tick: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(user.as_bytes());
        hasher.update(action.as_bytes());
        hasher.update(tick.to_be_bytes());
        hex::encode(hasher.finalize())
    }
}

fn current_tick() -> i64 {
    Utc::now().timestamp() / TICK_SECONDS
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
