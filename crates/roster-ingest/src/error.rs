//! Error types for spreadsheet ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while decoding a roster and locating its columns.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("input file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file exceeds the configured size limit.
    #[error("file {path} is too large ({size} bytes, limit {max_size})")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    // === Decoding Errors ===
    /// Input contained no rows at all.
    #[error("the file is empty")]
    EmptyInput,

    /// Unknown encoding label in configuration.
    #[error("unknown text encoding '{label}'")]
    UnknownEncoding { label: String },

    /// Failed to open a binary workbook.
    #[error("failed to read workbook: {message}")]
    Workbook { message: String },

    /// The workbook has no worksheets.
    #[error("the workbook contains no worksheets")]
    NoWorksheet,

    /// Failed to parse delimited text.
    #[error("failed to parse delimited text: {source}")]
    Delimited {
        #[source]
        source: csv::Error,
    },

    // === Schema Detection Errors ===
    /// No row in the scan window looked like a header.
    #[error(
        "could not recognise the trainee-id or course-code headers in the first {scanned_rows} rows; \
         check that the sheet has columns such as 'رقم المتدرب' and 'رمز المقرر', \
         or that the file was saved with the expected text encoding"
    )]
    SchemaNotDetected { scanned_rows: usize },

    /// A header row was found but a required column could not be resolved.
    #[error("header row {header_row} is incomplete: missing {}", missing_columns(.identity, .course_code))]
    RequiredColumnsMissing {
        header_row: usize,
        identity: bool,
        course_code: bool,
    },
}

impl IngestError {
    /// Returns true if decoding the same bytes differently may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SchemaNotDetected { .. })
    }
}

fn missing_columns(identity: &bool, course_code: &bool) -> &'static str {
    match (*identity, *course_code) {
        (true, true) => "trainee-id and course-code columns",
        (true, false) => "trainee-id column",
        (false, true) => "course-code column",
        (false, false) => "no columns",
    }
}

impl From<csv::Error> for IngestError {
    fn from(source: csv::Error) -> Self {
        Self::Delimited { source }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/path/to/roster.xlsx"),
        };
        assert_eq!(err.to_string(), "input file not found: /path/to/roster.xlsx");
    }

    #[test]
    fn test_required_columns_message() {
        let err = IngestError::RequiredColumnsMissing {
            header_row: 3,
            identity: false,
            course_code: true,
        };
        assert_eq!(
            err.to_string(),
            "header row 3 is incomplete: missing course-code column"
        );
    }

    #[test]
    fn test_only_schema_failure_is_recoverable() {
        assert!(IngestError::SchemaNotDetected { scanned_rows: 25 }.is_recoverable());
        assert!(!IngestError::EmptyInput.is_recoverable());
        assert!(
            !IngestError::RequiredColumnsMissing {
                header_row: 0,
                identity: true,
                course_code: false,
            }
            .is_recoverable()
        );
    }
}
