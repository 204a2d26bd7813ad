//! End-to-end import: roster bytes to committed records.

use std::path::Path;

use roster_ingest::{ExtractionStats, IngestOptions, IngestedSheet, SourceFormat, ingest_bytes, ingest_file};
use roster_store::{DEFAULT_BATCH_SIZE, RecordStore};
use tracing::info;

use crate::error::Result;
use crate::reconcile::Reconciler;
use crate::report::ImportReport;

/// Options for a full import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub ingest: IngestOptions,
    /// Operations per committed batch.
    pub batch_size: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            ingest: IngestOptions::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// What was read from the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetSummary {
    pub format: SourceFormat,
    pub encoding: Option<&'static str>,
    /// Zero-based header row.
    pub header_row: usize,
    pub trainees: usize,
    pub subjects: usize,
    pub stats: ExtractionStats,
}

impl SheetSummary {
    fn of(sheet: &IngestedSheet) -> Self {
        Self {
            format: sheet.format,
            encoding: sheet.encoding,
            header_row: sheet.header.row_index,
            trainees: sheet.extraction.trainee_count(),
            subjects: sheet.extraction.subject_count(),
            stats: sheet.stats,
        }
    }
}

/// Result of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Records were reconciled into the store.
    Imported {
        sheet: SheetSummary,
        report: ImportReport,
    },
    /// The header was found but no row held a usable trainee.
    NothingToImport { sheet: SheetSummary },
}

impl ImportOutcome {
    pub fn sheet(&self) -> &SheetSummary {
        match self {
            Self::Imported { sheet, .. } | Self::NothingToImport { sheet } => sheet,
        }
    }

    pub fn report(&self) -> Option<&ImportReport> {
        match self {
            Self::Imported { report, .. } => Some(report),
            Self::NothingToImport { .. } => None,
        }
    }
}

/// Imports an in-memory roster into `store`.
pub fn run_import(bytes: &[u8], store: &dyn RecordStore, options: &ImportOptions) -> Result<ImportOutcome> {
    let sheet = ingest_bytes(bytes, &options.ingest)?;
    reconcile_sheet(sheet, store, options)
}

/// Reads a roster file and imports it into `store`.
pub fn import_file(path: &Path, store: &dyn RecordStore, options: &ImportOptions) -> Result<ImportOutcome> {
    let sheet = ingest_file(path, &options.ingest)?;
    reconcile_sheet(sheet, store, options)
}

fn reconcile_sheet(
    sheet: IngestedSheet,
    store: &dyn RecordStore,
    options: &ImportOptions,
) -> Result<ImportOutcome> {
    let summary = SheetSummary::of(&sheet);
    if sheet.extraction.is_empty() {
        info!(data_rows = summary.stats.data_rows, "nothing to import");
        return Ok(ImportOutcome::NothingToImport { sheet: summary });
    }
    let report = Reconciler::new(store)
        .with_batch_size(options.batch_size)
        .reconcile(&sheet.extraction)?;
    Ok(ImportOutcome::Imported {
        sheet: summary,
        report,
    })
}
