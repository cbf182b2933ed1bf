//! Registration lifecycle: submission intake, booking-status lookup, and
//! the admin review flow that decides pending records.
//!
//! The lifecycle is deliberately small: a record is created `pending`,
//! read many times, and moved at most once to `approved` or `declined` by
//! a single conditional write. Everything else is rendering contracts per
//! state and plumbing to the record and image stores.

pub mod domain;
pub mod order;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantDetails, Decision, ImageUpload, RegistrationKind, RegistrationStatus,
    RegistrationSubmission, ValidationError, ORDER_ID_NOTICE,
};
pub use order::{OrderId, RegistrationId, ORDER_ID_PREFIX};
pub use repository::{
    ImageStore, ImageStoreError, RegistrationRecord, RegistrationRepository, RepositoryError,
    StatusView, PAYMENT_SCREENSHOT_BUCKET, PROFILE_PHOTO_BUCKET,
};
pub use router::registration_router;
pub use service::{EventRegistrationService, RegistrationServiceError};
