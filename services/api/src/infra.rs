use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use stagepass::pricing::{PriceBoard, PriceError, PriceStore};
use stagepass::registration::{
    EventRegistrationService, ImageStore, ImageStoreError, RegistrationId, RegistrationKind,
    RegistrationRecord, RegistrationRepository, RepositoryError, RegistrationStatus,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// The concrete service type everything in this binary is wired against.
pub(crate) type DeskService =
    EventRegistrationService<InMemoryRegistrationRepository, InMemoryImageStore, InMemoryPriceStore>;

/// Stand-in for the hosted record collection; rows live behind a mutex.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRegistrationRepository {
    records: Arc<Mutex<Vec<RegistrationRecord>>>,
}

impl RegistrationRepository for InMemoryRegistrationRepository {
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
        let mut rows: Vec<_> = guard
            .iter()
            .filter(|record| record.kind == kind)
            .cloned()
            .collect();
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
            .find(|record| &record.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if record.status.is_decided() {
            return Err(RepositoryError::Conflict);
        }
        record.status = status;
        Ok(record.clone())
    }
}

/// Stand-in for the hosted file buckets; upload never overwrites.
#[derive(Default, Clone)]
pub(crate) struct InMemoryImageStore {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl ImageStore for InMemoryImageStore {
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
        Ok(format!("/files/{key}"))
    }

    fn remove(&self, bucket: &str, name: &str) -> Result<(), ImageStoreError> {
        self.objects
            .lock()
            .expect("image mutex poisoned")
            .remove(&format!("{bucket}/{name}"));
        Ok(())
    }
}

/// Stand-in for the hosted price singleton.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPriceStore {
    board: Arc<Mutex<Option<PriceBoard>>>,
}

impl PriceStore for InMemoryPriceStore {
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
