use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::config::AdminConfig;
use crate::pricing::{PriceBoard, PriceError, PriceStore};
use crate::registration::domain::{
    ApplicantDetails, ImageUpload, RegistrationKind, RegistrationSubmission,
};
use crate::registration::order::RegistrationId;
use crate::registration::repository::{
    ImageStore, ImageStoreError, RegistrationRecord, RegistrationRepository, RepositoryError,
};
use crate::registration::service::EventRegistrationService;
use crate::registration::{registration_router, RegistrationStatus};

pub(super) fn admin_config() -> AdminConfig {
    AdminConfig {
        username: "admin".to_string(),
        password: "admin123".to_string(),
    }
}

pub(super) fn image(name: &str) -> ImageUpload {
    ImageUpload {
        file_name: name.to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    }
}

pub(super) fn performer_submission() -> RegistrationSubmission {
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
        payment_screenshot: image("upi-receipt.png"),
    }
}

pub(super) fn audience_submission() -> RegistrationSubmission {
    RegistrationSubmission {
        kind: RegistrationKind::Audience,
        applicant: ApplicantDetails {
            name: "Ravi".to_string(),
            email: "r@x.com".to_string(),
            mobile: "8888888888".to_string(),
        },
        transaction_id: "TXN2".to_string(),
        performance_type: None,
        profile_photo: image("ravi.jpg"),
        payment_screenshot: image("payment.jpg"),
    }
}

pub(super) type MemoryService =
    EventRegistrationService<MemoryRepository, MemoryImages, MemoryPrices>;

pub(super) fn build_service() -> (MemoryService, Arc<MemoryRepository>, Arc<MemoryImages>) {
    let repository = Arc::new(MemoryRepository::default());
    let images = Arc::new(MemoryImages::default());
    let prices = Arc::new(MemoryPrices::default());
    let service = EventRegistrationService::new(
        repository.clone(),
        images.clone(),
        prices,
        admin_config(),
    );
    (service, repository, images)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    registration_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<Vec<RegistrationRecord>>>,
}

impl RegistrationRepository for MemoryRepository {
    fn insert(&self, record: RegistrationRecord) -> Result<RegistrationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard
            .iter()
            .any(|existing| existing.order_id == record.order_id)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &RegistrationId) -> Result<Option<RegistrationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn fetch_by_order_id(
        &self,
        order_id: &str,
    ) -> Result<Option<RegistrationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .find(|record| record.order_id.as_str() == order_id)
            .cloned())
    }

    fn roster(&self, kind: RegistrationKind) -> Result<Vec<RegistrationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut matches: Vec<_> = guard
            .iter()
            .filter(|record| record.kind == kind)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }

    fn transition(
        &self,
        id: &RegistrationId,
        status: RegistrationStatus,
    ) -> Result<RegistrationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if record.status.is_decided() {
            return Err(RepositoryError::Conflict);
        }
        record.status = status;
        Ok(record.clone())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryImages {
    pub(super) objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryImages {
    pub(super) fn stored_names(&self) -> Vec<String> {
        let guard = self.objects.lock().expect("image mutex poisoned");
        let mut names: Vec<_> = guard.keys().cloned().collect();
        names.sort();
        names
    }
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
        let key = format!("{bucket}/{name}");
        self.objects
            .lock()
            .expect("image mutex poisoned")
            .remove(&key);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryPrices {
    board: Arc<Mutex<Option<PriceBoard>>>,
}

impl PriceStore for MemoryPrices {
    fn current(&self) -> Result<PriceBoard, PriceError> {
        let guard = self.board.lock().expect("price mutex poisoned");
        Ok(guard.unwrap_or_default())
    }

    fn update(&self, board: PriceBoard) -> Result<(), PriceError> {
        let mut guard = self.board.lock().expect("price mutex poisoned");
        *guard = Some(board);
        Ok(())
    }
}

/// Image store whose second upload always fails, for compensation tests.
#[derive(Default)]
pub(super) struct SecondUploadFails {
    pub(super) inner: MemoryImages,
    calls: Arc<Mutex<u32>>,
    pub(super) removals: Arc<Mutex<Vec<String>>>,
}

impl ImageStore for SecondUploadFails {
    fn upload(
        &self,
        bucket: &str,
        name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, ImageStoreError> {
        let mut calls = self.calls.lock().expect("call mutex poisoned");
        *calls += 1;
        if *calls >= 2 {
            return Err(ImageStoreError::Unavailable("upload quota hit".to_string()));
        }
        self.inner.upload(bucket, name, content_type, bytes)
    }

    fn remove(&self, bucket: &str, name: &str) -> Result<(), ImageStoreError> {
        self.removals
            .lock()
            .expect("removal mutex poisoned")
            .push(format!("{bucket}/{name}"));
        self.inner.remove(bucket, name)
    }
}

/// Repository that refuses every call, for failure-path tests.
pub(super) struct UnavailableRepository;

impl RegistrationRepository for UnavailableRepository {
    fn insert(&self, _record: RegistrationRecord) -> Result<RegistrationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &RegistrationId) -> Result<Option<RegistrationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_by_order_id(
        &self,
        _order_id: &str,
    ) -> Result<Option<RegistrationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn roster(&self, _kind: RegistrationKind) -> Result<Vec<RegistrationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn transition(
        &self,
        _id: &RegistrationId,
        _status: RegistrationStatus,
    ) -> Result<RegistrationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

/// Hand-built multipart body matching what the registration forms post.
pub(super) const MULTIPART_BOUNDARY: &str = "stagepass-test-boundary";

pub(super) fn multipart_body(fields: &[(&str, MultipartPart<'_>)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, part) in fields {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        match part {
            MultipartPart::Text(value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            MultipartPart::File {
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub(super) enum MultipartPart<'a> {
    Text(&'a str),
    File {
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

pub(super) fn performer_form_body() -> Vec<u8> {
    multipart_body(&[
        ("name", MultipartPart::Text("Asha")),
        ("email", MultipartPart::Text("a@x.com")),
        ("mobile", MultipartPart::Text("9999999999")),
        ("transaction_id", MultipartPart::Text("TXN1")),
        ("performance_type", MultipartPart::Text("Singing")),
        (
            "profile_photo",
            MultipartPart::File {
                file_name: "asha.png",
                content_type: "image/png",
                bytes: b"png-bytes",
            },
        ),
        (
            "payment_screenshot",
            MultipartPart::File {
                file_name: "upi.png",
                content_type: "image/png",
                bytes: b"png-bytes",
            },
        ),
    ])
}
