use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::admin::{AdminGate, SessionToken};
use crate::config::AdminConfig;
use crate::pricing::{PriceBoard, PriceError, PriceStore};

use super::domain::{Decision, RegistrationKind, RegistrationStatus, RegistrationSubmission, ValidationError};
use super::order::{next_registration_id, OrderId, RegistrationId};
use super::repository::{
    ImageStore, ImageStoreError, RegistrationRecord, RegistrationRepository, RepositoryError,
    StatusView, PAYMENT_SCREENSHOT_BUCKET, PROFILE_PHOTO_BUCKET,
};

/// Service composing the record store, image store, price store, and the
/// admin session gate. All flows — submission, status lookup, admin review,
/// price management — go through here.
pub struct EventRegistrationService<R, S, P> {
    repository: Arc<R>,
    images: Arc<S>,
    prices: Arc<P>,
    admin: AdminGate,
}

impl<R, S, P> EventRegistrationService<R, S, P>
where
    R: RegistrationRepository + 'static,
    S: ImageStore + 'static,
    P: PriceStore + 'static,
{
    pub fn new(repository: Arc<R>, images: Arc<S>, prices: Arc<P>, admin: AdminConfig) -> Self {
        Self {
            repository,
            images,
            prices,
            admin: AdminGate::new(admin),
        }
    }

    /// Run the whole submission flow: validate, issue an order id, store
    /// both images, insert the pending record. Any failure aborts the flow
    /// with a single error; images stored before the failure are removed
    /// best-effort so no orphaned upload outlives a failed submission.
    pub fn submit(
        &self,
        submission: RegistrationSubmission,
    ) -> Result<RegistrationRecord, RegistrationServiceError> {
        submission.validate()?;

        let order_id = OrderId::issue();

        let profile_name = format!("{order_id}-profile.{}", submission.profile_photo.extension());
        let profile_photo_url = self.images.upload(
            PROFILE_PHOTO_BUCKET,
            &profile_name,
            &submission.profile_photo.content_type,
            &submission.profile_photo.bytes,
        )?;

        let payment_name = format!(
            "{order_id}-payment.{}",
            submission.payment_screenshot.extension()
        );
        let payment_screenshot_url = match self.images.upload(
            PAYMENT_SCREENSHOT_BUCKET,
            &payment_name,
            &submission.payment_screenshot.content_type,
            &submission.payment_screenshot.bytes,
        ) {
            Ok(url) => url,
            Err(err) => {
                self.discard(PROFILE_PHOTO_BUCKET, &profile_name);
                return Err(err.into());
            }
        };

        let record = RegistrationRecord {
            id: next_registration_id(),
            order_id,
            kind: submission.kind,
            applicant: submission.applicant,
            transaction_id: submission.transaction_id,
            performance_type: submission.performance_type,
            profile_photo_url,
            payment_screenshot_url,
            status: RegistrationStatus::Pending,
            created_at: Utc::now(),
        };

        match self.repository.insert(record) {
            Ok(stored) => Ok(stored),
            Err(err) => {
                self.discard(PROFILE_PHOTO_BUCKET, &profile_name);
                self.discard(PAYMENT_SCREENSHOT_BUCKET, &payment_name);
                Err(err.into())
            }
        }
    }

    fn discard(&self, bucket: &str, name: &str) {
        if let Err(err) = self.images.remove(bucket, name) {
            warn!(%bucket, %name, error = %err, "failed to clean up stored image");
        }
    }

    /// Read-only status lookup by exact order id. Absence is a normal
    /// outcome, answered as `None`.
    pub fn lookup(&self, order_id: &str) -> Result<Option<StatusView>, RegistrationServiceError> {
        let record = self.repository.fetch_by_order_id(order_id)?;
        Ok(record.map(|r| r.status_view()))
    }

    /// Admin listing of one kind, newest first.
    pub fn roster(
        &self,
        kind: RegistrationKind,
    ) -> Result<Vec<RegistrationRecord>, RegistrationServiceError> {
        Ok(self.repository.roster(kind)?)
    }

    /// Apply an admin decision to a pending registration. The write is
    /// conditional on the record still being pending; a decided record
    /// answers `AlreadyDecided` instead of re-applying anything.
    pub fn decide(
        &self,
        id: &RegistrationId,
        decision: Decision,
    ) -> Result<RegistrationRecord, RegistrationServiceError> {
        match self.repository.transition(id, decision.target()) {
            Ok(record) => Ok(record),
            Err(RepositoryError::Conflict) => Err(RegistrationServiceError::AlreadyDecided),
            Err(err) => Err(err.into()),
        }
    }

    pub fn prices(&self) -> Result<PriceBoard, RegistrationServiceError> {
        Ok(self.prices.current()?)
    }

    pub fn set_prices(&self, board: PriceBoard) -> Result<(), RegistrationServiceError> {
        Ok(self.prices.update(board)?)
    }

    pub fn login(&self, username: &str, password: &str) -> Option<SessionToken> {
        self.admin.login(username, password)
    }

    pub fn authorize(&self, token: &str) -> bool {
        self.admin.authorize(token)
    }

    pub fn logout(&self, token: &str) {
        self.admin.logout(token)
    }
}

/// Error raised by the registration service.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Storage(#[from] ImageStoreError),
    #[error(transparent)]
    Pricing(#[from] PriceError),
    #[error("registration has already been decided")]
    AlreadyDecided,
}
