//! Shared on-disk document store.
//!
//! Both collections live in one JSON document so that a batch touching
//! subjects and trainees is still a single atomic file replacement. Every
//! read goes to disk, so several processes pointed at the same file see
//! each other's commits.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use roster_model::{RecordId, Subject, Trainee};
use tracing::{debug, info};

use crate::batch::{Collection, MAX_BATCH_OPERATIONS, WriteBatch};
use crate::error::{Result, StoreError};
use crate::snapshot::StoreSnapshot;
use crate::store::{ClearedRecords, RecordStore};

/// A JSON document holding every subject and trainee.
#[derive(Debug)]
pub struct DocumentStore {
    path: PathBuf,
    key: String,
    write_guard: Mutex<()>,
}

impl DocumentStore {
    /// Opens (without reading) the document at `path`, creating its
    /// directory if needed. A missing document reads as an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| StoreError::Io {
            operation: "create directory",
            path: parent.clone(),
            source: e,
        })?;
        let canonical_parent = parent.canonicalize().map_err(|e| StoreError::Io {
            operation: "resolve",
            path: parent.clone(),
            source: e,
        })?;
        let file_name = path.file_name().ok_or_else(|| StoreError::Unavailable {
            reason: format!("{} is not a file path", path.display()),
        })?;
        let key = format!("document:{}", canonical_parent.join(file_name).display());
        debug!(store = %key, "document store opened");
        Ok(Self {
            path,
            key,
            write_guard: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole document.
    pub fn load(&self) -> Result<StoreSnapshot> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoreSnapshot::default());
            }
            Err(e) => {
                return Err(StoreError::Io {
                    operation: "read",
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Deserialization {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Writes the whole document via a temp file and rename.
    fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| StoreError::Serialization { source: e })?;
        let temp_path = self.path.with_extension("json.tmp");

        let mut file = File::create(&temp_path).map_err(|e| StoreError::Io {
            operation: "create",
            path: temp_path.clone(),
            source: e,
        })?;
        file.write_all(&bytes).map_err(|e| StoreError::Io {
            operation: "write",
            path: temp_path.clone(),
            source: e,
        })?;
        file.sync_all().map_err(|e| StoreError::Io {
            operation: "sync",
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| StoreError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: self.path.clone(),
            source: e,
        })?;
        Ok(())
    }

    /// Read-modify-write under the per-handle guard.
    fn modify<T>(&self, change: impl FnOnce(&mut StoreSnapshot) -> Result<T>) -> Result<T> {
        let _guard = self.write_guard.lock().map_err(|_| StoreError::Unavailable {
            reason: "document store lock poisoned".to_string(),
        })?;
        let mut snapshot = self.load()?;
        let value = change(&mut snapshot)?;
        self.save(&snapshot)?;
        Ok(value)
    }
}

impl RecordStore for DocumentStore {
    fn store_key(&self) -> &str {
        &self.key
    }

    fn list_subjects(&self) -> Result<Vec<Subject>> {
        Ok(self.load()?.subjects)
    }

    fn list_trainees(&self) -> Result<Vec<Trainee>> {
        Ok(self.load()?.trainees)
    }

    fn commit(&self, batch: WriteBatch) -> Result<()> {
        if batch.len() > MAX_BATCH_OPERATIONS {
            return Err(StoreError::BatchTooLarge {
                len: batch.len(),
                max: MAX_BATCH_OPERATIONS,
            });
        }
        let operations = batch.len();
        self.modify(|snapshot| snapshot.apply_batch(batch))?;
        debug!(store = %self.key, operations, "batch committed");
        Ok(())
    }

    fn delete_subject(&self, id: &RecordId) -> Result<()> {
        self.modify(|snapshot| snapshot.delete(Collection::Subjects, id))
    }

    fn delete_trainee(&self, id: &RecordId) -> Result<()> {
        self.modify(|snapshot| snapshot.delete(Collection::Trainees, id))
    }

    fn clear(&self) -> Result<ClearedRecords> {
        let cleared = self.modify(|snapshot| {
            let cleared = ClearedRecords {
                subjects: snapshot.subjects.len(),
                trainees: snapshot.trainees.len(),
            };
            *snapshot = StoreSnapshot::default();
            Ok(cleared)
        })?;
        info!(
            path = %self.path.display(),
            subjects = cleared.subjects,
            trainees = cleared.trainees,
            "document store cleared"
        );
        Ok(cleared)
    }
}
