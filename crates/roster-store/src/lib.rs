//! Record stores for subjects and trainees.
//!
//! [`RecordStore`] is the capability the import engine and the CLI work
//! against. Two backends implement it:
//!
//! - [`DocumentStore`]: one JSON document on disk, replaced atomically on
//!   every write and shared by every process that opens the same path.
//! - [`MemoryStore`]: per-process records, used for dry runs and tests.
//!
//! [`StoreConfig`] selects a backend from settings.

mod batch;
mod config;
mod document;
mod error;
mod lookup;
mod memory;
mod snapshot;
mod store;

pub use batch::{Collection, DEFAULT_BATCH_SIZE, MAX_BATCH_OPERATIONS, WriteBatch, WriteOp};
pub use config::{StoreBackend, StoreConfig};
pub use document::DocumentStore;
pub use error::{Result, StoreError};
pub use lookup::{TraineeLookup, lookup_trainee};
pub use memory::MemoryStore;
pub use snapshot::StoreSnapshot;
pub use store::{ClearedRecords, RecordStore};
