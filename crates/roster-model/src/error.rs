//! Error types for roster records.

use thiserror::Error;

/// Errors raised while constructing or validating records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// Record identifiers must contain at least one non-whitespace character.
    #[error("record id must not be empty")]
    EmptyRecordId,

    /// Subject codes are natural keys and cannot be blank.
    #[error("subject code must not be empty")]
    EmptySubjectCode,

    /// Credit hours must be positive.
    #[error("credit hours must be positive for subject {code}")]
    InvalidCreditHours { code: String },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::InvalidCreditHours {
            code: "MTH101".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "credit hours must be positive for subject MTH101"
        );
    }
}
