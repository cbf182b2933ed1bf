//! StagePass: the registration desk for a showcase night.
//!
//! Performer and audience submissions, order-id booking status, and the
//! gated admin review that decides pending registrations. Persistence and
//! image storage sit behind traits so the hosted backend can be swapped
//! for the in-memory implementations used by the API service and tests.

pub mod admin;
pub mod config;
pub mod error;
pub mod pricing;
pub mod registration;
pub mod telemetry;
