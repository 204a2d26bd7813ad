//! In-memory record collections shared by every backend.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use roster_model::{RecordId, Subject, Trainee};

use crate::batch::{Collection, WriteBatch, WriteOp};
use crate::error::{Result, StoreError};

/// Both collections in store order.
///
/// This is also the on-disk layout of the document store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSnapshot {
    pub subjects: Vec<Subject>,
    pub trainees: Vec<Trainee>,
}

impl StoreSnapshot {
    pub fn new(subjects: Vec<Subject>, trainees: Vec<Trainee>) -> Self {
        Self { subjects, trainees }
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty() && self.trainees.is_empty()
    }

    /// Applies every operation or none of them.
    ///
    /// The whole batch is validated against the current records before
    /// anything is written.
    pub fn apply_batch(&mut self, batch: WriteBatch) -> Result<()> {
        self.validate_batch(&batch)?;

        let mut positions: HashMap<RecordId, usize> = HashMap::new();
        if batch.count(Collection::Trainees) > 0 {
            positions.extend(
                self.trainees
                    .iter()
                    .enumerate()
                    .map(|(index, trainee)| (trainee.id.clone(), index)),
            );
        }
        for op in batch {
            match op {
                WriteOp::CreateSubject { id, subject } => {
                    self.subjects.push(subject.with_id(id));
                }
                WriteOp::CreateTrainee { id, trainee } => {
                    positions.insert(id.clone(), self.trainees.len());
                    self.trainees.push(trainee.with_id(id));
                }
                WriteOp::UpdateTrainee { id, patch } => {
                    if let Some(&index) = positions.get(&id) {
                        self.trainees[index].apply(patch);
                    }
                }
            }
        }
        Ok(())
    }

    /// Checks ids, subject codes and update targets for the whole batch.
    fn validate_batch(&self, batch: &WriteBatch) -> Result<()> {
        let mut subject_ids: HashSet<&RecordId> = self.subjects.iter().map(|s| &s.id).collect();
        let mut codes: HashSet<&str> = self.subjects.iter().map(|s| s.code.as_str()).collect();
        let mut trainee_ids: HashSet<&RecordId> = self.trainees.iter().map(|t| &t.id).collect();

        for op in batch.ops() {
            match op {
                WriteOp::CreateSubject { id, subject } => {
                    subject.validate()?;
                    if !subject_ids.insert(id) {
                        return Err(StoreError::DuplicateId {
                            collection: Collection::Subjects,
                            id: id.clone(),
                        });
                    }
                    if !codes.insert(subject.code.as_str()) {
                        return Err(StoreError::DuplicateSubjectCode {
                            code: subject.code.clone(),
                        });
                    }
                }
                WriteOp::CreateTrainee { id, .. } => {
                    if !trainee_ids.insert(id) {
                        return Err(StoreError::DuplicateId {
                            collection: Collection::Trainees,
                            id: id.clone(),
                        });
                    }
                }
                WriteOp::UpdateTrainee { id, .. } => {
                    if !trainee_ids.contains(id) {
                        return Err(StoreError::NotFound {
                            collection: Collection::Trainees,
                            id: id.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Removes a record by id.
    pub fn delete(&mut self, collection: Collection, id: &RecordId) -> Result<()> {
        let before = self.len(collection);
        match collection {
            Collection::Subjects => self.subjects.retain(|s| &s.id != id),
            Collection::Trainees => self.trainees.retain(|t| &t.id != id),
        }
        if self.len(collection) == before {
            return Err(StoreError::NotFound {
                collection,
                id: id.clone(),
            });
        }
        Ok(())
    }

    pub fn len(&self, collection: Collection) -> usize {
        match collection {
            Collection::Subjects => self.subjects.len(),
            Collection::Trainees => self.trainees.len(),
        }
    }
}
