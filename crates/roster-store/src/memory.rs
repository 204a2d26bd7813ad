//! Per-process in-memory store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use roster_model::{RecordId, Subject, Trainee};
use tracing::debug;

use crate::batch::{Collection, MAX_BATCH_OPERATIONS, WriteBatch};
use crate::error::{Result, StoreError};
use crate::snapshot::StoreSnapshot;
use crate::store::{ClearedRecords, RecordStore};

static NEXT_STORE: AtomicU64 = AtomicU64::new(1);

/// Records held in process memory. Lost when the store is dropped.
#[derive(Debug)]
pub struct MemoryStore {
    key: String,
    state: RwLock<StoreSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_snapshot(StoreSnapshot::default())
    }

    /// Creates a store pre-loaded with `snapshot`, e.g. a copy of another
    /// store for a dry run.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let n = NEXT_STORE.fetch_add(1, Ordering::Relaxed);
        Self {
            key: format!("memory:{n}"),
            state: RwLock::new(snapshot),
        }
    }

    /// Copies every record out of `store`.
    pub fn snapshot_of(store: &dyn RecordStore) -> Result<Self> {
        let snapshot = StoreSnapshot::new(store.list_subjects()?, store.list_trainees()?);
        debug!(
            source = store.store_key(),
            subjects = snapshot.subjects.len(),
            trainees = snapshot.trainees.len(),
            "store copied into memory"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Clone of the current contents.
    pub fn snapshot(&self) -> Result<StoreSnapshot> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreSnapshot>> {
        self.state.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreSnapshot>> {
        self.state.write().map_err(|_| poisoned())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable {
        reason: "in-memory store lock poisoned".to_string(),
    }
}

impl RecordStore for MemoryStore {
    fn store_key(&self) -> &str {
        &self.key
    }

    fn list_subjects(&self) -> Result<Vec<Subject>> {
        Ok(self.read()?.subjects.clone())
    }

    fn list_trainees(&self) -> Result<Vec<Trainee>> {
        Ok(self.read()?.trainees.clone())
    }

    fn commit(&self, batch: WriteBatch) -> Result<()> {
        if batch.len() > MAX_BATCH_OPERATIONS {
            return Err(StoreError::BatchTooLarge {
                len: batch.len(),
                max: MAX_BATCH_OPERATIONS,
            });
        }
        self.write()?.apply_batch(batch)
    }

    fn delete_subject(&self, id: &RecordId) -> Result<()> {
        self.write()?.delete(Collection::Subjects, id)
    }

    fn delete_trainee(&self, id: &RecordId) -> Result<()> {
        self.write()?.delete(Collection::Trainees, id)
    }

    fn clear(&self) -> Result<ClearedRecords> {
        let mut state = self.write()?;
        let cleared = ClearedRecords {
            subjects: state.subjects.len(),
            trainees: state.trainees.len(),
        };
        *state = StoreSnapshot::default();
        Ok(cleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_model::{NewSubject, NewTrainee};

    #[test]
    fn test_create_and_list() {
        let store = MemoryStore::new();
        let subject = store.create_subject(NewSubject::new("MTH101", "Math")).unwrap();
        let trainee = store.create_trainee(NewTrainee::default()).unwrap();

        assert_eq!(store.list_subjects().unwrap(), vec![subject]);
        assert_eq!(store.list_trainees().unwrap(), vec![trainee]);
    }

    #[test]
    fn test_store_keys_are_distinct() {
        let a = MemoryStore::new();
        let b = MemoryStore::new();
        assert_ne!(a.store_key(), b.store_key());
        assert!(a.store_key().starts_with("memory:"));
    }

    #[test]
    fn test_oversized_batch_rejected() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        for n in 0..=MAX_BATCH_OPERATIONS {
            batch.create_trainee(RecordId::new(format!("t-{n}")).unwrap(), NewTrainee::default());
        }
        let err = store.commit(batch).unwrap_err();
        assert!(matches!(err, StoreError::BatchTooLarge { .. }));
        assert!(store.list_trainees().unwrap().is_empty());
    }

    #[test]
    fn test_clear_and_missing_delete() {
        let store = MemoryStore::new();
        store.create_subject(NewSubject::new("MTH101", "")).unwrap();
        let cleared = store.clear().unwrap();
        assert_eq!(cleared.subjects, 1);
        assert!(store.list_subjects().unwrap().is_empty());

        let err = store.delete_subject(&RecordId::new("gone").unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
