//! Row extraction and normalization.
//!
//! Every row below the detected header contributes at most one
//! (trainee, course) pair. Rows with a missing or implausibly short
//! identity, or without a course code, are skipped silently: rosters carry
//! subtotal lines, blank separators and footer notes that are not errors.

use roster_model::{Extraction, SubjectDraft, TraineeDraft};
use tracing::{debug, trace};

use crate::detect::DetectedHeader;

/// Prefix for trainee names synthesized from the identity.
pub const PLACEHOLDER_NAME_PREFIX: &str = "متدرب ";

/// Minimum length of a sanitized identity.
pub const MIN_IDENTITY_LEN: usize = 3;

/// Minimum length (in characters) of a course code.
pub const MIN_COURSE_CODE_LEN: usize = 2;

/// Strips every character that is not an ASCII letter or digit.
///
/// Identities are copied from spreadsheets where numbers pick up
/// separators, spaces, or a trailing `.0`, so the comparison key keeps
/// only the alphanumeric characters.
pub fn sanitize_identity(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Counters describing what happened to each data row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Rows below the header.
    pub data_rows: usize,
    /// Rows that contributed a (trainee, course) pair.
    pub accepted_rows: usize,
    pub skipped_missing_identity: usize,
    pub skipped_short_identity: usize,
    pub skipped_missing_code: usize,
}

impl ExtractionStats {
    pub fn skipped_rows(&self) -> usize {
        self.skipped_missing_identity + self.skipped_short_identity + self.skipped_missing_code
    }
}

/// Walks the rows below `header` and accumulates drafts.
pub fn extract_records(rows: &[Vec<String>], header: &DetectedHeader) -> (Extraction, ExtractionStats) {
    let columns = header.columns;
    let mut extraction = Extraction::default();
    let mut stats = ExtractionStats::default();

    for (offset, row) in rows.iter().skip(header.row_index + 1).enumerate() {
        let row_number = header.row_index + 1 + offset;
        stats.data_rows += 1;

        let raw_identity = cell(row, Some(columns.identity));
        if raw_identity.is_empty() {
            trace!(row = row_number, "skipping row without identity");
            stats.skipped_missing_identity += 1;
            continue;
        }
        let identity = sanitize_identity(raw_identity);
        if identity.len() < MIN_IDENTITY_LEN {
            trace!(row = row_number, "skipping row with short identity");
            stats.skipped_short_identity += 1;
            continue;
        }

        let code = cell(row, Some(columns.course_code));
        if code.chars().count() < MIN_COURSE_CODE_LEN {
            trace!(row = row_number, "skipping row without course code");
            stats.skipped_missing_code += 1;
            continue;
        }

        let course_name = non_empty(cell(row, columns.course_name)).unwrap_or(code);
        let trainee_name = non_empty(cell(row, columns.trainee_name));

        let draft = extraction
            .trainees
            .entry(identity.clone())
            .or_insert_with(|| TraineeDraft {
                full_name: trainee_name.map_or_else(
                    || format!("{PLACEHOLDER_NAME_PREFIX}{identity}"),
                    str::to_string,
                ),
                name_from_source: trainee_name.is_some(),
                national_id: identity.clone(),
                trainee_number: identity.clone(),
                phone_number: cell(row, columns.phone).to_string(),
                major: cell(row, columns.major).to_string(),
                ..TraineeDraft::default()
            });
        draft.outstanding_codes.insert(code.to_string());

        extraction
            .subjects
            .entry(code.to_string())
            .or_insert_with(|| SubjectDraft::new(code, course_name));

        stats.accepted_rows += 1;
    }

    debug!(
        trainees = extraction.trainee_count(),
        subjects = extraction.subject_count(),
        data_rows = stats.data_rows,
        skipped = stats.skipped_rows(),
        "rows extracted"
    );
    (extraction, stats)
}

/// Trimmed cell value, or `""` when the column is absent or the row is short.
fn cell(row: &[String], index: Option<usize>) -> &str {
    index
        .and_then(|index| row.get(index))
        .map_or("", |value| value.trim())
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}
