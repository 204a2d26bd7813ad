//! Write batches.
//!
//! A [`WriteBatch`] is applied by a store as one unit: either every
//! operation becomes visible or none does.

use std::fmt;

use roster_model::{NewSubject, NewTrainee, RecordId, TraineePatch};

/// Largest batch any backend accepts.
pub const MAX_BATCH_OPERATIONS: usize = 500;

/// Default number of operations per committed batch during import.
pub const DEFAULT_BATCH_SIZE: usize = 400;

/// A record collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Subjects,
    Trainees,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subjects => "subjects",
            Self::Trainees => "trainees",
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            Self::Subjects => "subject",
            Self::Trainees => "trainee",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single write inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    CreateSubject { id: RecordId, subject: NewSubject },
    CreateTrainee { id: RecordId, trainee: NewTrainee },
    UpdateTrainee { id: RecordId, patch: TraineePatch },
}

impl WriteOp {
    pub fn collection(&self) -> Collection {
        match self {
            Self::CreateSubject { .. } => Collection::Subjects,
            Self::CreateTrainee { .. } | Self::UpdateTrainee { .. } => Collection::Trainees,
        }
    }

    pub fn id(&self) -> &RecordId {
        match self {
            Self::CreateSubject { id, .. }
            | Self::CreateTrainee { id, .. }
            | Self::UpdateTrainee { id, .. } => id,
        }
    }
}

/// An ordered group of writes committed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn create_subject(&mut self, id: RecordId, subject: NewSubject) {
        self.push(WriteOp::CreateSubject { id, subject });
    }

    pub fn create_trainee(&mut self, id: RecordId, trainee: NewTrainee) {
        self.push(WriteOp::CreateTrainee { id, trainee });
    }

    pub fn update_trainee(&mut self, id: RecordId, patch: TraineePatch) {
        self.push(WriteOp::UpdateTrainee { id, patch });
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of operations touching `collection`.
    pub fn count(&self, collection: Collection) -> usize {
        self.ops
            .iter()
            .filter(|op| op.collection() == collection)
            .count()
    }

    /// Splits `ops` into batches of at most `size` operations, keeping order.
    ///
    /// A `size` of zero is treated as one.
    pub fn chunked(ops: Vec<WriteOp>, size: usize) -> Vec<WriteBatch> {
        let size = size.max(1);
        let mut batches = Vec::with_capacity(ops.len().div_ceil(size));
        let mut current = WriteBatch::new();
        for op in ops {
            if current.len() == size {
                batches.push(std::mem::take(&mut current));
            }
            current.push(op);
        }
        if !current.is_empty() {
            batches.push(current);
        }
        batches
    }
}

impl IntoIterator for WriteBatch {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject_op(n: usize) -> WriteOp {
        WriteOp::CreateSubject {
            id: RecordId::new(format!("s-{n}")).unwrap(),
            subject: NewSubject::new(format!("C{n}"), ""),
        }
    }

    #[test]
    fn test_chunked_respects_ceiling_and_order() {
        let ops: Vec<WriteOp> = (0..9).map(subject_op).collect();
        let batches = WriteBatch::chunked(ops, 4);
        let sizes: Vec<usize> = batches.iter().map(WriteBatch::len).collect();
        assert_eq!(sizes, vec![4, 4, 1]);
        assert_eq!(batches[2].ops()[0].id().as_str(), "s-8");
    }

    #[test]
    fn test_chunked_empty() {
        assert!(WriteBatch::chunked(Vec::new(), 400).is_empty());
        assert_eq!(WriteBatch::chunked(vec![subject_op(1)], 0).len(), 1);
    }

    #[test]
    fn test_count_by_collection() {
        let mut batch = WriteBatch::new();
        batch.push(subject_op(1));
        batch.update_trainee(RecordId::new("t-1").unwrap(), TraineePatch::default());
        assert_eq!(batch.count(Collection::Subjects), 1);
        assert_eq!(batch.count(Collection::Trainees), 1);
    }
}
