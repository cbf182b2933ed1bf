use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ApplicantDetails, RegistrationKind, RegistrationStatus};
use super::order::{OrderId, RegistrationId};

/// Logical bucket for applicant profile photos.
pub const PROFILE_PHOTO_BUCKET: &str = "profile-photos";
/// Logical bucket for payment screenshots.
pub const PAYMENT_SCREENSHOT_BUCKET: &str = "payment-screenshots";

/// The stored registration row, exactly as admin listings render it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub id: RegistrationId,
    pub order_id: OrderId,
    pub kind: RegistrationKind,
    pub applicant: ApplicantDetails,
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_type: Option<String>,
    pub profile_photo_url: String,
    pub payment_screenshot_url: String,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
}

impl RegistrationRecord {
    /// What the public status lookup may reveal for the current state:
    /// order id and status always; personal detail and the profile photo
    /// only once approved.
    pub fn status_view(&self) -> StatusView {
        let mut view = StatusView {
            order_id: self.order_id.0.clone(),
            status: self.status.label(),
            name: None,
            email: None,
            mobile: None,
            profile_photo_url: None,
        };
        if self.status == RegistrationStatus::Approved {
            view.name = Some(self.applicant.name.clone());
            view.email = Some(self.applicant.email.clone());
            view.mobile = Some(self.applicant.mobile.clone());
            view.profile_photo_url = Some(self.profile_photo_url.clone());
        }
        view
    }
}

/// Sanitized representation returned by the booking-status lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub order_id: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,
}

/// Storage abstraction over the hosted record collection so the service can
/// be exercised in isolation.
pub trait RegistrationRepository: Send + Sync {
    fn insert(&self, record: RegistrationRecord) -> Result<RegistrationRecord, RepositoryError>;
    fn fetch(&self, id: &RegistrationId) -> Result<Option<RegistrationRecord>, RepositoryError>;
    fn fetch_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<Option<RegistrationRecord>, RepositoryError>;
    /// All registrations of one kind, newest first.
    fn roster(&self, kind: RegistrationKind) -> Result<Vec<RegistrationRecord>, RepositoryError>;
    /// Single conditional write: moves a `pending` record to `status` and
    /// returns the updated row. A record that already left `pending` answers
    /// `Conflict`; nothing is re-applied.
    fn transition(
        &self,
        id: &RegistrationId,
        status: RegistrationStatus,
    ) -> Result<RegistrationRecord, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Seam over the hosted file store: named uploads that never overwrite,
/// answering a publicly resolvable reference.
pub trait ImageStore: Send + Sync {
    fn upload(
        &self,
        bucket: &str,
        name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, ImageStoreError>;
    /// Compensating delete for uploads orphaned by a later failure.
    fn remove(&self, bucket: &str, name: &str) -> Result<(), ImageStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    #[error("object '{0}' already exists")]
    AlreadyExists(String),
    #[error("image store unavailable: {0}")]
    Unavailable(String),
}
