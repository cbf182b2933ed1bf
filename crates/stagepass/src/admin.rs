//! Server-side session gate for the admin review panel.
//!
//! Login compares the presented credentials against the configured pair and
//! issues an opaque token; every admin operation must present that token and
//! it is verified against the in-process session set. Tokens are revocable
//! and never leave the server except as the bearer value itself.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::Utc;

use crate::config::AdminConfig;

/// Opaque bearer credential returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(pub String);

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

// Process-local entropy only; acceptable for a single-operator panel but
// not a cryptographic token.
fn next_session_token() -> SessionToken {
    let seq = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let millis = Utc::now().timestamp_millis();
    SessionToken(format!("sess-{millis:x}-{seq:06x}"))
}

/// Credential check plus live-session bookkeeping.
pub struct AdminGate {
    credentials: AdminConfig,
    sessions: Mutex<HashSet<String>>,
}

impl AdminGate {
    pub fn new(credentials: AdminConfig) -> Self {
        Self {
            credentials,
            sessions: Mutex::new(HashSet::new()),
        }
    }

    /// Issue a session token when the credentials match, `None` otherwise.
    pub fn login(&self, username: &str, password: &str) -> Option<SessionToken> {
        if username != self.credentials.username || password != self.credentials.password {
            return None;
        }
        let token = next_session_token();
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .insert(token.0.clone());
        Some(token)
    }

    /// True when the token belongs to a live session.
    pub fn authorize(&self, token: &str) -> bool {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .contains(token)
    }

    /// Revoke a session; revoking an unknown token is a no-op.
    pub fn logout(&self, token: &str) {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .remove(token);
    }
}
