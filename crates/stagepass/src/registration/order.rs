//! Identifier issuing for the submission flow.
//!
//! Order ids are the user-facing lookup key: a fixed prefix plus the epoch
//! millisecond at issue time. Monotonically non-decreasing within a process,
//! but two submissions inside the same millisecond collide; the scale of the
//! event treats that probability as negligible and callers should not read
//! any stronger guarantee into it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Prefix every issued order id starts with.
pub const ORDER_ID_PREFIX: &str = "ORD";

/// User-facing, self-service lookup key for a registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn issue() -> Self {
        Self(format!("{ORDER_ID_PREFIX}{}", Utc::now().timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Internal identifier admin writes are keyed by; distinct from the order id
/// so the lookup key can stay immutable and human-communicable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationId(pub String);

static REGISTRATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_registration_id() -> RegistrationId {
    let id = REGISTRATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RegistrationId(format!("reg-{id:06}"))
}
