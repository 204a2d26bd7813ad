//! End-to-end ingestion: bytes in, drafts out.
//!
//! Text input is tried with UTF-8 first and then with each fallback
//! encoding until a header row is detected. Workbooks carry their own
//! encoding and are decoded once.

use std::path::Path;

use roster_model::Extraction;
use tracing::{debug, info, info_span, warn};

use crate::detect::{DEFAULT_SCAN_ROWS, DetectedHeader, detect_header};
use crate::error::{IngestError, Result};
use crate::extract::{ExtractionStats, extract_records};
use crate::keywords::HeaderKeywords;
use crate::source::{Grid, SourceFormat, TextEncoding, decode_text, parse_delimited, read_workbook};

/// Maximum input file size (50 MB).
pub const MAX_INPUT_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Legacy Arabic code page used by older registry exports.
pub const DEFAULT_FALLBACK_ENCODING: &str = "windows-1256";

/// Options controlling detection and decoding.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Leading rows inspected for a header.
    pub scan_rows: usize,
    pub keywords: HeaderKeywords,
    /// Encodings tried, in order, after UTF-8 fails for text input.
    pub fallback_encodings: Vec<TextEncoding>,
    pub max_file_size: u64,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            scan_rows: DEFAULT_SCAN_ROWS,
            keywords: HeaderKeywords::default(),
            fallback_encodings: vec![TextEncoding::from(encoding_rs::WINDOWS_1256)],
            max_file_size: MAX_INPUT_FILE_SIZE,
        }
    }
}

impl IngestOptions {
    /// Replaces the fallback encodings from configuration labels.
    pub fn with_fallback_labels<S: AsRef<str>>(mut self, labels: &[S]) -> Result<Self> {
        self.fallback_encodings = labels
            .iter()
            .map(|label| TextEncoding::from_label(label.as_ref()))
            .collect::<Result<_>>()?;
        Ok(self)
    }
}

/// The result of ingesting one roster.
#[derive(Debug, Clone)]
pub struct IngestedSheet {
    pub format: SourceFormat,
    /// Name of the encoding that produced the header; `None` for workbooks.
    pub encoding: Option<&'static str>,
    pub header: DetectedHeader,
    pub extraction: Extraction,
    pub stats: ExtractionStats,
}

/// Ingests an in-memory roster.
pub fn ingest_bytes(bytes: &[u8], options: &IngestOptions) -> Result<IngestedSheet> {
    let _span = info_span!("ingest", size = bytes.len()).entered();
    if bytes.is_empty() {
        return Err(IngestError::EmptyInput);
    }

    let format = SourceFormat::sniff(bytes);
    debug!(%format, "source format detected");
    let (grid, header, encoding) = match format {
        SourceFormat::Workbook => {
            let grid = read_workbook(bytes)?;
            let header = detect_header(&grid, &options.keywords, options.scan_rows)?;
            (grid, header, None)
        }
        SourceFormat::Text => {
            let (grid, header, encoding) = detect_text(bytes, options)?;
            (grid, header, Some(encoding.name()))
        }
    };

    let (extraction, stats) = extract_records(&grid, &header);
    info!(
        header_row = header.row_index,
        trainees = extraction.trainee_count(),
        subjects = extraction.subject_count(),
        skipped_rows = stats.skipped_rows(),
        "roster ingested"
    );
    Ok(IngestedSheet {
        format,
        encoding,
        header,
        extraction,
        stats,
    })
}

/// Reads and ingests a roster file, enforcing the size limit first.
pub fn ingest_file(path: &Path, options: &IngestOptions) -> Result<IngestedSheet> {
    let metadata = std::fs::metadata(path).map_err(|e| io_error(path, e))?;
    if metadata.len() > options.max_file_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: options.max_file_size,
        });
    }
    let bytes = std::fs::read(path).map_err(|e| io_error(path, e))?;
    ingest_bytes(&bytes, options)
}

fn io_error(path: &Path, e: std::io::Error) -> IngestError {
    if e.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        }
    }
}

/// Tries UTF-8, then each fallback, until a header is detected.
///
/// Only a missing header moves on to the next encoding; every other error
/// is returned as is. When no encoding works, the error from the first
/// decodable attempt is reported.
fn detect_text(
    bytes: &[u8],
    options: &IngestOptions,
) -> Result<(Grid, DetectedHeader, TextEncoding)> {
    let attempts = std::iter::once(TextEncoding::utf8()).chain(
        options
            .fallback_encodings
            .iter()
            .copied()
            .filter(|encoding| *encoding != TextEncoding::utf8()),
    );

    let mut first_error = None;
    for encoding in attempts {
        let Some(text) = decode_text(bytes, encoding) else {
            debug!(encoding = encoding.name(), "input is not valid in this encoding");
            continue;
        };
        let grid = parse_delimited(&text)?;
        match detect_header(&grid, &options.keywords, options.scan_rows) {
            Ok(header) => {
                debug!(encoding = encoding.name(), "header detected");
                return Ok((grid, header, encoding));
            }
            Err(e) if e.is_recoverable() => {
                warn!(encoding = encoding.name(), "no header found, trying next encoding");
                first_error.get_or_insert(e);
            }
            Err(e) => return Err(e),
        }
    }
    Err(first_error.unwrap_or(IngestError::SchemaNotDetected { scanned_rows: 0 }))
}
