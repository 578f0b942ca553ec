use std::{collections::HashMap, sync::Arc};

use configs::IdPolicy;
use models::student::{StudentId, StudentInput, StudentRecord};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::assets::PhotoStore;
use crate::errors::ServiceError;
use crate::storage::{JsonSnapshotFile, Snapshot};

struct RegistryState {
    records: HashMap<StudentId, StudentRecord>,
    /// Next value of the monotonic counter. Never decreases.
    next_id: StudentId,
}

impl RegistryState {
    fn from_snapshot(snapshot: Snapshot) -> Self {
        // Keys are bounded by MAX_STUDENT_ID on decode, but stay saturating anyway.
        let after_max_key = snapshot.records.keys().max().map_or(1, |max| max.saturating_add(1));
        let next_id = snapshot.next_id.unwrap_or(1).max(after_max_key);
        Self { records: snapshot.records, next_id }
    }

    fn assign_id(&mut self, policy: IdPolicy) -> StudentId {
        match policy {
            // Shrinks on delete, so the result can name a live record.
            IdPolicy::CountBased => self.records.len() as StudentId + 1,
            IdPolicy::Monotonic => {
                let id = self.next_id;
                self.next_id = self.next_id.saturating_add(1);
                id
            }
        }
    }
}

/// In-memory registry of students mirrored to a JSON document.
///
/// Every read and write goes through one `RwLock`; critical sections only
/// touch the map and the id counter. Validation happens before the lock is
/// taken and photo I/O after it is released.
///
/// Flushes are serialized by their own lock and snapshot the map only once
/// they hold it, so whichever flush finishes last writes the newest state.
#[derive(Clone)]
pub struct StudentRegistry {
    inner: Arc<RwLock<RegistryState>>,
    file: Arc<JsonSnapshotFile>,
    photos: Arc<dyn PhotoStore>,
    flush_lock: Arc<Mutex<()>>,
    policy: IdPolicy,
}

impl StudentRegistry {
    /// Load the registry from `file`. A missing or corrupt document is logged
    /// and yields an empty registry.
    pub async fn open(file: JsonSnapshotFile, photos: Arc<dyn PhotoStore>, policy: IdPolicy) -> Arc<Self> {
        let snapshot = match file.load().await {
            Ok(snapshot) => {
                info!(path = %file.path().display(), count = snapshot.records.len(), "student data loaded");
                snapshot
            }
            Err(e) => {
                warn!(path = %file.path().display(), error = %e, "could not load student data; starting empty");
                Snapshot::default()
            }
        };
        Arc::new(Self {
            inner: Arc::new(RwLock::new(RegistryState::from_snapshot(snapshot))),
            file: Arc::new(file),
            photos,
            flush_lock: Arc::new(Mutex::new(())),
            policy,
        })
    }

    pub fn policy(&self) -> IdPolicy {
        self.policy
    }

    /// All current records, ordered by id.
    pub async fn list(&self) -> Vec<StudentRecord> {
        let state = self.inner.read().await;
        let mut students: Vec<StudentRecord> = state.records.values().cloned().collect();
        drop(state);
        students.sort_by_key(|s| s.id);
        students
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn get(&self, id: StudentId) -> Result<StudentRecord, ServiceError> {
        let state = self.inner.read().await;
        state.records.get(&id).cloned().ok_or_else(|| ServiceError::not_found("student"))
    }

    /// Validate `input`, assign an id, store the photo, and schedule a flush.
    ///
    /// The flush runs in the background; its failure is logged only.
    /// If the photo cannot be written the insert is undone and `Io` returned.
    pub async fn add(&self, input: StudentInput, photo: &[u8]) -> Result<StudentRecord, ServiceError> {
        // Validate outside the lock; a rejected add never touches the map.
        let new = input.validate()?;

        // Id assignment and insert share one critical section.
        let (record, displaced) = {
            let mut state = self.inner.write().await;
            let id = state.assign_id(self.policy);
            let record = new.into_record(id, self.photos.path_for(id));
            let displaced = state.records.insert(id, record.clone());
            (record, displaced)
        };
        if let Some(old) = &displaced {
            warn!(id = record.id, overwritten = %old.name, "count-based id collided with a live record; it was overwritten");
        }

        // Photo I/O runs unlocked. A flush may already have persisted the
        // record by now, so an effective rollback has to be flushed as well.
        if let Err(e) = self.photos.put(record.id, photo).await {
            error!(id = record.id, error = %e, "failed to store photo; rolling back insert");
            if self.undo_insert(&record, displaced).await {
                let _ = self.flush().await;
            }
            return Err(e);
        }

        debug!(id = record.id, name = %record.name, "student added");
        // Fire and forget: the caller does not wait on the disk.
        self.spawn_flush();
        Ok(record)
    }

    /// Remove `id` and flush before returning. A failed flush is logged and
    /// does not restore the record.
    pub async fn delete(&self, id: StudentId) -> Result<StudentRecord, ServiceError> {
        let removed = {
            let mut state = self.inner.write().await;
            state.records.remove(&id)
        }
        .ok_or_else(|| ServiceError::not_found("student"))?;

        debug!(id, "student deleted");
        let _ = self.flush().await;
        Ok(removed)
    }

    /// Write the whole registry to disk.
    pub async fn flush(&self) -> Result<(), ServiceError> {
        // One flush at a time; the snapshot is taken only once we hold the
        // flush lock so the last writer always carries the newest state.
        let _guard = self.flush_lock.lock().await;
        let snapshot = self.snapshot().await;
        let count = snapshot.records.len();
        match self.file.save(&snapshot).await {
            Ok(()) => {
                info!(path = %self.file.path().display(), count, "student data saved");
                Ok(())
            }
            Err(e) => {
                error!(path = %self.file.path().display(), error = %e, "failed to save student data");
                Err(e)
            }
        }
    }

    fn spawn_flush(&self) {
        let this = self.clone();
        tokio::spawn(async move {
            let _ = this.flush().await;
        });
    }

    async fn snapshot(&self) -> Snapshot {
        let state = self.inner.read().await;
        Snapshot {
            records: state.records.clone(),
            next_id: match self.policy {
                IdPolicy::Monotonic => Some(state.next_id),
                IdPolicy::CountBased => None,
            },
        }
    }

    /// Returns whether the map changed.
    async fn undo_insert(&self, record: &StudentRecord, displaced: Option<StudentRecord>) -> bool {
        let mut state = self.inner.write().await;
        // Leave the slot alone if a later add already replaced our record.
        if state.records.get(&record.id) != Some(record) {
            return false;
        }
        match displaced {
            Some(old) => {
                state.records.insert(record.id, old);
            }
            None => {
                state.records.remove(&record.id);
            }
        }
        true
    }
}
