//! Registration fees shown on the landing page and edited from the admin
//! panel. A second, independent piece of shared mutable state with the same
//! single-atomic-write discipline as the registration transitions.

use serde::{Deserialize, Serialize};

/// The current fee pair, in whole rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBoard {
    pub performer_price: u32,
    pub audience_price: u32,
}

impl Default for PriceBoard {
    fn default() -> Self {
        Self {
            performer_price: 349,
            audience_price: 149,
        }
    }
}

/// Storage seam for the fee singleton. Readable by anyone; writes come only
/// from the authenticated admin surface.
pub trait PriceStore: Send + Sync {
    fn current(&self) -> Result<PriceBoard, PriceError>;
    fn update(&self, board: PriceBoard) -> Result<(), PriceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    #[error("price store unavailable: {0}")]
    Unavailable(String),
}
