//! Store error types.
//!
//! Errors carry enough context for [`StoreError::user_message`] and
//! [`StoreError::suggestion`] to tell an operator what went wrong.

use std::path::PathBuf;

use roster_model::{ModelError, RecordId};
use thiserror::Error;

use crate::batch::Collection;

/// Record store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    // === Backend Errors ===
    /// File I/O error.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store document exists but could not be parsed.
    #[error("store document {path} is corrupted: {source}")]
    Deserialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Records could not be serialized.
    #[error("failed to serialize store document: {source}")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// Temp file couldn't be renamed over the store document.
    #[error("failed to replace {target_path}: {source}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backend cannot serve requests.
    #[error("record store unavailable: {reason}")]
    Unavailable { reason: String },

    // === Record Errors ===
    /// No record with this id.
    #[error("no {} with id {id}", .collection.singular())]
    NotFound { collection: Collection, id: RecordId },

    /// A create operation reused an existing id.
    #[error("{} id {id} already exists", .collection.singular())]
    DuplicateId { collection: Collection, id: RecordId },

    /// A subject with this code already exists.
    #[error("subject code {code} already exists")]
    DuplicateSubjectCode { code: String },

    /// A record failed validation.
    #[error(transparent)]
    InvalidRecord(#[from] ModelError),

    /// A batch exceeded the backend's per-commit ceiling.
    #[error("batch of {len} operations exceeds the limit of {max}")]
    BatchTooLarge { len: usize, max: usize },
}

impl StoreError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => format!("Could not {} the store at {}", operation, path.display()),
            Self::Deserialization { path, .. } => format!(
                "The store document at {} could not be read. It may be corrupted.",
                path.display()
            ),
            Self::Serialization { .. } => {
                "An error occurred while saving records to the store.".to_string()
            }
            Self::AtomicWriteFailed { target_path, .. } => format!(
                "Could not save the store to {}. Please check disk space and permissions.",
                target_path.display()
            ),
            Self::Unavailable { reason } => format!("The record store is unavailable: {reason}"),
            Self::NotFound { collection, id } => {
                format!("No {} with id '{}' exists.", collection.singular(), id)
            }
            Self::DuplicateId { collection, id } => {
                format!("A {} with id '{}' already exists.", collection.singular(), id)
            }
            Self::DuplicateSubjectCode { code } => {
                format!("A subject with code '{code}' already exists.")
            }
            Self::InvalidRecord(err) => format!("The record is invalid: {err}"),
            Self::BatchTooLarge { len, max } => {
                format!("Tried to write {len} records at once; the store accepts at most {max}.")
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the store path exists and is readable.".into())
                } else {
                    Some("Check that you have permission to write to the store path.".into())
                }
            }
            Self::Deserialization { .. } => {
                Some("Restore the store document from a backup, or run `roster clear`.".into())
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or point `store.path` at a different location.".into())
            }
            Self::Unavailable { .. } => {
                Some("Check the `[store]` section of the settings file.".into())
            }
            Self::NotFound { collection, .. } => Some(format!(
                "List existing records with `roster {}`.",
                collection.as_str()
            )),
            Self::BatchTooLarge { .. } => Some("Lower `import.batch_size`.".into()),
            Self::Serialization { .. }
            | Self::DuplicateId { .. }
            | Self::DuplicateSubjectCode { .. }
            | Self::InvalidRecord(_) => None,
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_messages() {
        let err = StoreError::NotFound {
            collection: Collection::Trainees,
            id: RecordId::new("t-9").unwrap(),
        };
        assert_eq!(err.to_string(), "no trainee with id t-9");
        assert_eq!(err.user_message(), "No trainee with id 't-9' exists.");
        assert_eq!(
            err.suggestion().as_deref(),
            Some("List existing records with `roster trainees`.")
        );
    }

    #[test]
    fn test_invalid_record_is_transparent() {
        let err = StoreError::from(ModelError::EmptySubjectCode);
        assert_eq!(err.to_string(), "subject code must not be empty");
        assert!(err.suggestion().is_none());
    }
}
