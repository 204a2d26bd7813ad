//! The record store capability.

use roster_model::{NewSubject, NewTrainee, RecordId, Subject, Trainee, TraineePatch};
use tracing::info;

use crate::batch::{Collection, WriteBatch};
use crate::error::Result;

/// Counts of records removed by [`RecordStore::clear`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearedRecords {
    pub subjects: usize,
    pub trainees: usize,
}

/// Persistence for subjects and trainees.
///
/// Implementations must apply each [`WriteBatch`] atomically. Reads return
/// records in store order, which is insertion order for both backends.
pub trait RecordStore: Send + Sync {
    /// Stable identity of the underlying storage.
    ///
    /// Two handles to the same storage return the same key.
    fn store_key(&self) -> &str;

    fn list_subjects(&self) -> Result<Vec<Subject>>;

    fn list_trainees(&self) -> Result<Vec<Trainee>>;

    /// Commits `batch` as one unit.
    fn commit(&self, batch: WriteBatch) -> Result<()>;

    fn delete_subject(&self, id: &RecordId) -> Result<()>;

    fn delete_trainee(&self, id: &RecordId) -> Result<()>;

    /// Reserves a fresh id for a record about to be created.
    fn allocate_id(&self, _collection: Collection) -> RecordId {
        RecordId::generate()
    }

    fn create_subject(&self, subject: NewSubject) -> Result<Subject> {
        let id = self.allocate_id(Collection::Subjects);
        let mut batch = WriteBatch::new();
        batch.create_subject(id.clone(), subject.clone());
        self.commit(batch)?;
        Ok(subject.with_id(id))
    }

    fn create_trainee(&self, trainee: NewTrainee) -> Result<Trainee> {
        let id = self.allocate_id(Collection::Trainees);
        let mut batch = WriteBatch::new();
        batch.create_trainee(id.clone(), trainee.clone());
        self.commit(batch)?;
        Ok(trainee.with_id(id))
    }

    fn update_trainee(&self, id: &RecordId, patch: TraineePatch) -> Result<()> {
        let mut batch = WriteBatch::new();
        batch.update_trainee(id.clone(), patch);
        self.commit(batch)
    }

    /// Deletes every subject and trainee.
    fn clear(&self) -> Result<ClearedRecords> {
        let mut cleared = ClearedRecords::default();
        for trainee in self.list_trainees()? {
            self.delete_trainee(&trainee.id)?;
            cleared.trainees += 1;
        }
        for subject in self.list_subjects()? {
            self.delete_subject(&subject.id)?;
            cleared.subjects += 1;
        }
        info!(
            store = self.store_key(),
            subjects = cleared.subjects,
            trainees = cleared.trainees,
            "store cleared"
        );
        Ok(cleared)
    }
}
