//! Import counters.

use std::fmt;

/// How far the commit phase got.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitProgress {
    pub batches_committed: usize,
    pub total_batches: usize,
    pub subjects_committed: usize,
    pub trainees_committed: usize,
}

/// Outcome counts of a successful import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub subjects_created: usize,
    pub subjects_reused: usize,
    pub trainees_created: usize,
    /// Existing trainees updated; several rows matching one trainee count once.
    pub trainees_updated: usize,
    /// Outstanding codes dropped because no subject matched them.
    pub unresolved_codes: usize,
    pub batches_committed: usize,
}

impl ImportReport {
    pub fn trainees_total(&self) -> usize {
        self.trainees_created + self.trainees_updated
    }

    pub fn subjects_total(&self) -> usize {
        self.subjects_created + self.subjects_reused
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "subjects: {} created, {} reused; trainees: {} created, {} updated; \
             {} unresolved codes; {} {} committed",
            self.subjects_created,
            self.subjects_reused,
            self.trainees_created,
            self.trainees_updated,
            self.unresolved_codes,
            self.batches_committed,
            if self.batches_committed == 1 { "batch" } else { "batches" },
        )
    }
}
