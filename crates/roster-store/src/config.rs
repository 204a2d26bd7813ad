//! Backend selection.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::DocumentStore;
use crate::error::{Result, StoreError};
use crate::memory::MemoryStore;
use crate::store::RecordStore;

/// Which backend holds the records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// JSON document on disk, shared by every process using the same path.
    #[default]
    Document,
    /// Records live only as long as the process.
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `[store]` settings section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Document path; required by the document backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: None,
        }
    }

    pub fn document(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: StoreBackend::Document,
            path: Some(path.into()),
        }
    }

    /// Opens the configured backend.
    pub fn open(&self) -> Result<Box<dyn RecordStore>> {
        let store: Box<dyn RecordStore> = match self.backend {
            StoreBackend::Memory => Box::new(MemoryStore::new()),
            StoreBackend::Document => {
                let path = self.path.as_ref().ok_or_else(|| StoreError::Unavailable {
                    reason: "the document backend needs `store.path`".to_string(),
                })?;
                Box::new(DocumentStore::open(path)?)
            }
        };
        info!(backend = %self.backend, store = store.store_key(), "record store opened");
        Ok(store)
    }
}
