//! Roster spreadsheet ingestion.
//!
//! Turns an uploaded outstanding-subjects roster (xlsx, xls, ods or
//! delimited text) into trainee and subject drafts:
//!
//! 1. [`source`] decodes bytes into a grid of string cells.
//! 2. [`detect`] finds the header row and maps columns to roles.
//! 3. [`extract`] normalizes each data row into drafts.
//!
//! [`ingest_bytes`] and [`ingest_file`] run the three stages, retrying
//! text input with fallback encodings when no header is recognised.

pub mod detect;
pub mod error;
pub mod extract;
pub mod keywords;
pub mod pipeline;
pub mod source;

pub use detect::{
    ColumnMapping, DEFAULT_SCAN_ROWS, DetectedHeader, HeaderMap, detect_header,
    normalize_header_cell, score_row,
};
pub use error::{IngestError, Result};
pub use extract::{
    ExtractionStats, MIN_COURSE_CODE_LEN, MIN_IDENTITY_LEN, PLACEHOLDER_NAME_PREFIX,
    extract_records, sanitize_identity,
};
pub use keywords::{ColumnRole, HeaderClassifier, HeaderKeywords, KeywordGroup};
pub use pipeline::{
    DEFAULT_FALLBACK_ENCODING, IngestOptions, IngestedSheet, MAX_INPUT_FILE_SIZE, ingest_bytes,
    ingest_file,
};
pub use source::{SourceFormat, TextEncoding};
