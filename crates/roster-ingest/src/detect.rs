//! Header row detection and column-role mapping.
//!
//! Rosters are exported from several systems and are often preceded by
//! title rows, report dates or merged banner cells. Instead of assuming the
//! header is the first row, every row in a bounded scan window is scored by
//! how many *required* roles (identity, course code) it has a matching cell
//! for. The first row with the highest score wins.

use tracing::{debug, debug_span};

use crate::error::{IngestError, Result};
use crate::keywords::{ColumnRole, HeaderClassifier};

/// Default number of leading rows inspected for a header.
pub const DEFAULT_SCAN_ROWS: usize = 25;

/// Normalizes a header cell for keyword matching.
pub fn normalize_header_cell(value: &str) -> String {
    value.trim().trim_matches('\u{feff}').trim().to_lowercase()
}

/// Ordered mapping from normalized header label to column index.
///
/// A repeated label keeps the position of its first occurrence and takes
/// the index of its last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, usize)>,
}

impl HeaderMap {
    pub fn from_row(row: &[String]) -> Self {
        let mut map = Self::default();
        for (index, cell) in row.iter().enumerate() {
            let label = normalize_header_cell(cell);
            if label.is_empty() {
                continue;
            }
            map.insert(label, index);
        }
        map
    }

    fn insert(&mut self, label: String, index: usize) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == label) {
            Some(entry) => entry.1 = index,
            None => self.entries.push((label, index)),
        }
    }

    /// Column index for an exact (normalized) label.
    pub fn get(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, index)| *index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries
            .iter()
            .map(|(label, index)| (label.as_str(), *index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Column indices resolved for each role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub identity: usize,
    pub course_code: usize,
    pub course_name: Option<usize>,
    pub trainee_name: Option<usize>,
    pub phone: Option<usize>,
    pub major: Option<usize>,
}

impl ColumnMapping {
    pub fn index_of(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::Identity => Some(self.identity),
            ColumnRole::CourseCode => Some(self.course_code),
            ColumnRole::CourseName => self.course_name,
            ColumnRole::TraineeName => self.trainee_name,
            ColumnRole::Phone => self.phone,
            ColumnRole::Major => self.major,
        }
    }
}

/// A detected header row and its column mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedHeader {
    /// Zero-based index of the header row.
    pub row_index: usize,
    /// Number of required roles the header row satisfied (1 or 2).
    pub score: u8,
    pub labels: HeaderMap,
    pub columns: ColumnMapping,
}

/// Scores a row: the number of required roles with at least one matching cell.
pub fn score_row<C: HeaderClassifier + ?Sized>(row: &[String], classifier: &C) -> u8 {
    let cells: Vec<String> = row.iter().map(|cell| normalize_header_cell(cell)).collect();
    let mut score = 0;
    for role in ColumnRole::REQUIRED {
        if cells.iter().any(|cell| classifier.matches(role, cell)) {
            score += 1;
        }
    }
    score
}

/// Finds the header row in the first `scan_rows` rows and maps its columns.
///
/// # Errors
///
/// - [`IngestError::EmptyInput`] if there are no rows.
/// - [`IngestError::SchemaNotDetected`] if no scanned row matches either
///   required role.
/// - [`IngestError::RequiredColumnsMissing`] if the best row lacks a
///   resolvable identity or course-code column.
pub fn detect_header<C: HeaderClassifier + ?Sized>(
    rows: &[Vec<String>],
    classifier: &C,
    scan_rows: usize,
) -> Result<DetectedHeader> {
    if rows.is_empty() {
        return Err(IngestError::EmptyInput);
    }
    let scanned_rows = rows.len().min(scan_rows);
    let span = debug_span!("detect_header", scanned_rows);
    let _guard = span.enter();

    let mut best: Option<(usize, u8)> = None;
    for (index, row) in rows.iter().take(scanned_rows).enumerate() {
        let score = score_row(row, classifier);
        if score > best.map_or(0, |(_, best_score)| best_score) {
            best = Some((index, score));
        }
    }

    let Some((row_index, score)) = best else {
        debug!("no header row found");
        return Err(IngestError::SchemaNotDetected { scanned_rows });
    };

    let labels = HeaderMap::from_row(&rows[row_index]);
    let columns = resolve_columns(&labels, classifier).map_err(|(identity, course_code)| {
        IngestError::RequiredColumnsMissing {
            header_row: row_index,
            identity,
            course_code,
        }
    })?;
    debug!(
        row_index,
        score,
        identity = columns.identity,
        course_code = columns.course_code,
        "header row detected"
    );

    Ok(DetectedHeader {
        row_index,
        score,
        labels,
        columns,
    })
}

/// Resolves every role against the header labels.
///
/// Optional roles claim columns first (in [`ColumnRole::OPTIONAL`] order)
/// so that, for example, `اسم المتدرب` is not mistaken for the identity
/// column merely because it contains `المتدرب`. Required roles prefer
/// unclaimed columns and only fall back to a claimed one when nothing else
/// matches. On failure, returns which required roles were missing.
fn resolve_columns<C: HeaderClassifier + ?Sized>(
    labels: &HeaderMap,
    classifier: &C,
) -> std::result::Result<ColumnMapping, (bool, bool)> {
    let mut claimed: Vec<usize> = Vec::new();
    let mut optional = [None; 4];
    for (slot, role) in optional.iter_mut().zip(ColumnRole::OPTIONAL) {
        *slot = find_column(labels, classifier, role, &claimed);
        if let Some(index) = *slot {
            claimed.push(index);
        }
    }
    let [trainee_name, course_name, phone, major] = optional;

    let identity = find_required(labels, classifier, ColumnRole::Identity, &claimed);
    if let Some(index) = identity {
        claimed.push(index);
    }
    let course_code = find_required(labels, classifier, ColumnRole::CourseCode, &claimed);

    match (identity, course_code) {
        (Some(identity), Some(course_code)) => Ok(ColumnMapping {
            identity,
            course_code,
            course_name,
            trainee_name,
            phone,
            major,
        }),
        (identity, course_code) => Err((identity.is_none(), course_code.is_none())),
    }
}

fn find_required<C: HeaderClassifier + ?Sized>(
    labels: &HeaderMap,
    classifier: &C,
    role: ColumnRole,
    claimed: &[usize],
) -> Option<usize> {
    find_column(labels, classifier, role, claimed)
        .or_else(|| find_column(labels, classifier, role, &[]))
}

/// First header (in label order) matching the role and not yet claimed.
fn find_column<C: HeaderClassifier + ?Sized>(
    labels: &HeaderMap,
    classifier: &C,
    role: ColumnRole,
    claimed: &[usize],
) -> Option<usize> {
    labels
        .iter()
        .find(|(label, index)| !claimed.contains(index) && classifier.matches(role, label))
        .map(|(_, index)| index)
}
