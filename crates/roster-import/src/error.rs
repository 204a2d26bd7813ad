//! Import error types.

use roster_ingest::IngestError;
use roster_store::StoreError;
use thiserror::Error;

use crate::report::CommitProgress;

/// Errors that end an import run.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The roster could not be decoded or its columns were not recognised.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Nothing was written: the store could not be read, or the first
    /// batch was rejected.
    #[error("record store unavailable, nothing was imported: {source}")]
    StoreUnavailable {
        #[source]
        source: StoreError,
    },

    /// Some batches were committed before a later one failed.
    #[error(
        "import stopped after {} of {} batches: {source}",
        .progress.batches_committed,
        .progress.total_batches
    )]
    BatchCommitFailed {
        progress: CommitProgress,
        #[source]
        source: StoreError,
    },
}

impl ImportError {
    /// Returns true if part of the import was committed.
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::BatchCommitFailed { .. })
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Ingest(err) => err.to_string(),
            Self::StoreUnavailable { source } => {
                format!("Nothing was imported. {}", source.user_message())
            }
            Self::BatchCommitFailed { progress, source } => format!(
                "The import was only partly saved: {} subjects and {} trainees were written \
                 before the store failed. {}",
                progress.subjects_committed,
                progress.trainees_committed,
                source.user_message()
            ),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Ingest(err) if err.is_recoverable() => Some(
                "Save the sheet as .xlsx or as UTF-8 text, or add its encoding to \
                 `import.fallback_encodings`."
                    .into(),
            ),
            Self::Ingest(_) => None,
            Self::StoreUnavailable { source } => source.suggestion(),
            Self::BatchCommitFailed { .. } => Some(
                "Fix the store problem and import the same file again; existing records are \
                 updated, not duplicated."
                    .into(),
            ),
        }
    }
}

/// Result type for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn store_down() -> StoreError {
        StoreError::Unavailable {
            reason: "disk full".to_string(),
        }
    }

    #[test]
    fn test_partial_flag() {
        let partial = ImportError::BatchCommitFailed {
            progress: CommitProgress {
                batches_committed: 1,
                total_batches: 3,
                subjects_committed: 2,
                trainees_committed: 0,
            },
            source: store_down(),
        };
        assert!(partial.is_partial());
        assert_eq!(
            partial.to_string(),
            "import stopped after 1 of 3 batches: record store unavailable: disk full"
        );
        assert!(!ImportError::StoreUnavailable { source: store_down() }.is_partial());
    }

    #[test]
    fn test_schema_failure_suggests_encoding() {
        let err = ImportError::from(IngestError::SchemaNotDetected { scanned_rows: 25 });
        assert!(err.suggestion().unwrap().contains("fallback_encodings"));
    }
}
