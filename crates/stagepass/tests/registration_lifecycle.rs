//! End-to-end lifecycle: submit through the public service API, decide from
//! the admin side, and observe every state through the booking-status view.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use stagepass::config::AdminConfig;
use stagepass::pricing::{PriceBoard, PriceError, PriceStore};
use stagepass::registration::{
    ApplicantDetails, Decision, EventRegistrationService, ImageStore, ImageStoreError, ImageUpload,
    RegistrationId, RegistrationKind, RegistrationRecord, RegistrationRepository,
    RegistrationStatus, RegistrationSubmission, RepositoryError, ORDER_ID_PREFIX,
};

#[derive(Default)]
struct MemoryRepository {
    records: Mutex<Vec<RegistrationRecord>>,
}

impl RegistrationRepository for MemoryRepository {
    fn insert(&self, record: RegistrationRecord) -> Result<RegistrationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|r| r.order_id == record.order_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &RegistrationId) -> Result<Option<RegistrationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|r| &r.id == id).cloned())
    }

    fn fetch_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<Option<RegistrationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .find(|r| r.order_id.as_str() == order_id)
            .cloned())
    }

    fn roster(&self, kind: RegistrationKind) -> Result<Vec<RegistrationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut rows: Vec<_> = guard.iter().filter(|r| r.kind == kind).cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn transition(
        &self,
        id: &RegistrationId,
        status: RegistrationStatus,
    ) -> Result<RegistrationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if record.status.is_decided() {
            return Err(RepositoryError::Conflict);
        }
        record.status = status;
        Ok(record.clone())
    }
}

#[derive(Default)]
struct MemoryImages {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl ImageStore for MemoryImages {
    fn upload(
        &self,
        bucket: &str,
        name: &str,
        _content_type: &str,
        bytes: &[u8],
    ) -> Result<String, ImageStoreError> {
        let key = format!("{bucket}/{name}");
        let mut guard = self.objects.lock().expect("image mutex poisoned");
        if guard.contains_key(&key) {
            return Err(ImageStoreError::AlreadyExists(key));
        }
        guard.insert(key.clone(), bytes.to_vec());
        Ok(format!("memory://{key}"))
    }

    fn remove(&self, bucket: &str, name: &str) -> Result<(), ImageStoreError> {
        self.objects
            .lock()
            .expect("image mutex poisoned")
            .remove(&format!("{bucket}/{name}"));
        Ok(())
    }
}

#[derive(Default)]
struct MemoryPrices {
    board: Mutex<Option<PriceBoard>>,
}

impl PriceStore for MemoryPrices {
    fn current(&self) -> Result<PriceBoard, PriceError> {
        Ok(self.board.lock().expect("price mutex poisoned").unwrap_or_default())
    }

    fn update(&self, board: PriceBoard) -> Result<(), PriceError> {
        *self.board.lock().expect("price mutex poisoned") = Some(board);
        Ok(())
    }
}

fn image(name: &str) -> ImageUpload {
    ImageUpload {
        file_name: name.to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![1, 2, 3, 4],
    }
}

fn service() -> EventRegistrationService<MemoryRepository, MemoryImages, MemoryPrices> {
    EventRegistrationService::new(
        Arc::new(MemoryRepository::default()),
        Arc::new(MemoryImages::default()),
        Arc::new(MemoryPrices::default()),
        AdminConfig {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        },
    )
}

fn asha_submission() -> RegistrationSubmission {
    RegistrationSubmission {
        kind: RegistrationKind::Performer,
        applicant: ApplicantDetails {
            name: "Asha".to_string(),
            email: "a@x.com".to_string(),
            mobile: "9999999999".to_string(),
        },
        transaction_id: "TXN1".to_string(),
        performance_type: Some("Singing".to_string()),
        profile_photo: image("asha.png"),
        payment_screenshot: image("upi.png"),
    }
}

#[test]
fn performer_registration_runs_the_full_lifecycle() {
    let desk = service();

    let record = desk.submit(asha_submission()).expect("submission succeeds");
    assert_eq!(record.kind, RegistrationKind::Performer);
    assert_eq!(record.status, RegistrationStatus::Pending);
    assert!(record.order_id.as_str().starts_with(ORDER_ID_PREFIX));

    let pending = desk
        .lookup(record.order_id.as_str())
        .expect("lookup succeeds")
        .expect("record present");
    assert_eq!(pending.status, "pending");
    assert!(pending.name.is_none());

    let token = desk.login("admin", "admin123").expect("login succeeds");
    assert!(desk.authorize(&token.0));

    let roster = desk
        .roster(RegistrationKind::Performer)
        .expect("roster loads");
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].applicant.name, "Asha");

    desk.decide(&record.id, Decision::Decline)
        .expect("decline succeeds");

    let declined = desk
        .lookup(record.order_id.as_str())
        .expect("lookup succeeds")
        .expect("record present");
    assert_eq!(declined.status, "declined");
    assert_eq!(declined.order_id, record.order_id.as_str());
    assert!(declined.name.is_none());
    assert!(declined.email.is_none());
    assert!(declined.profile_photo_url.is_none());

    assert!(matches!(
        desk.decide(&record.id, Decision::Approve),
        Err(stagepass::registration::RegistrationServiceError::AlreadyDecided)
    ));
}

#[test]
fn approved_lookup_round_trips_the_submitted_details() {
    let desk = service();

    let record = desk.submit(asha_submission()).expect("submission succeeds");
    desk.decide(&record.id, Decision::Approve)
        .expect("approval succeeds");

    let view = desk
        .lookup(record.order_id.as_str())
        .expect("lookup succeeds")
        .expect("record present");
    assert_eq!(view.status, "approved");
    assert_eq!(view.name.as_deref(), Some("Asha"));
    assert_eq!(view.email.as_deref(), Some("a@x.com"));
    assert_eq!(view.mobile.as_deref(), Some("9999999999"));
}

#[test]
fn unknown_order_ids_resolve_to_not_found() {
    let desk = service();
    let view = desk.lookup("DOES-NOT-EXIST").expect("lookup never fails");
    assert!(view.is_none());
}

#[test]
fn prices_update_atomically_and_read_back() {
    let desk = service();
    assert_eq!(desk.prices().expect("prices load"), PriceBoard::default());
    desk.set_prices(PriceBoard {
        performer_price: 499,
        audience_price: 249,
    })
    .expect("prices update");
    assert_eq!(desk.prices().expect("prices load").audience_price, 249);
}

// Order ids derive from epoch milliseconds. Two submissions in the same
// millisecond collide; the second insert then conflicts rather than
// overwriting the first. This pins the documented boundary instead of
// pretending the ids are unique.
#[test]
fn same_millisecond_submissions_conflict_instead_of_overwriting() {
    let desk = service();

    let first = desk.submit(asha_submission());
    let second = desk.submit(asha_submission());

    match (first, second) {
        (Ok(a), Ok(b)) => assert_ne!(a.order_id, b.order_id),
        (Ok(_), Err(err)) => assert!(matches!(
            err,
            stagepass::registration::RegistrationServiceError::Repository(
                RepositoryError::Conflict
            ) | stagepass::registration::RegistrationServiceError::Storage(
                ImageStoreError::AlreadyExists(_)
            )
        )),
        other => panic!("unexpected outcome: {other:?}"),
    }
}
