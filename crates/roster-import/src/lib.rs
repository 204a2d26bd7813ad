//! Roster import.
//!
//! Reconciles the drafts produced by `roster-ingest` into a
//! [`RecordStore`](roster_store::RecordStore): missing subjects are created,
//! trainees are matched by natural key and updated in place or inserted,
//! and the writes are committed in bounded batches.
//!
//! [`run_import`] and [`import_file`] run the whole pipeline.

mod error;
mod lock;
mod pipeline;
mod reconcile;
mod report;

pub use error::{ImportError, Result};
pub use lock::store_lock;
pub use pipeline::{ImportOptions, ImportOutcome, SheetSummary, import_file, run_import};
pub use reconcile::{ImportPlan, Reconciler};
pub use report::{CommitProgress, ImportReport};
