//! Persisted settings.
//!
//! Settings are read from a TOML file in the user's config directory, or
//! from the path given with `--config`.

use std::path::{Path, PathBuf};

use roster_import::ImportOptions;
use roster_ingest::{DEFAULT_FALLBACK_ENCODING, DEFAULT_SCAN_ROWS, HeaderKeywords, IngestOptions};
use roster_store::{DEFAULT_BATCH_SIZE, StoreBackend, StoreConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// =============================================================================
// ROOT SETTINGS
// =============================================================================

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Which record store to use.
    pub store: StoreConfig,

    /// Import tuning.
    pub import: ImportSettings,

    /// Header keyword overrides.
    pub keywords: HeaderKeywords,
}

impl Settings {
    /// Loads settings from `path`.
    ///
    /// A missing file gives the defaults. An unreadable or invalid file
    /// also gives the defaults, with a warning.
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Self::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read settings, using defaults");
                return Self::default();
            }
        };
        match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid settings, using defaults");
                Self::default()
            }
        }
    }

    /// Saves settings to `path`, creating its directory.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {e}"))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write settings: {e}"))
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize settings: {e}"))
    }

    /// The default settings file path.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "Roster", "roster")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }

    /// Default location of the document store.
    pub fn default_store_path() -> PathBuf {
        directories::ProjectDirs::from("org", "Roster", "roster")
            .map(|dirs| dirs.data_dir().join("roster.json"))
            .unwrap_or_else(|| PathBuf::from("roster.json"))
    }

    /// Store configuration with the default document path filled in.
    pub fn store_config(&self) -> StoreConfig {
        let mut config = self.store.clone();
        if config.backend == StoreBackend::Document && config.path.is_none() {
            config.path = Some(Self::default_store_path());
        }
        config
    }

    /// Import options built from the `[import]` and `[keywords]` sections.
    pub fn import_options(&self) -> roster_ingest::Result<ImportOptions> {
        let ingest = IngestOptions {
            scan_rows: self.import.scan_rows,
            keywords: self.keywords.clone(),
            ..IngestOptions::default()
        }
        .with_fallback_labels(&self.import.fallback_encodings)?;
        Ok(ImportOptions {
            ingest,
            batch_size: self.import.batch_size,
        })
    }
}

// =============================================================================
// IMPORT SETTINGS
// =============================================================================

/// The `[import]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Operations per committed batch.
    pub batch_size: usize,

    /// Leading rows searched for the header.
    pub scan_rows: usize,

    /// Encodings tried after UTF-8 for text rosters.
    pub fallback_encodings: Vec<String>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            scan_rows: DEFAULT_SCAN_ROWS,
            fallback_encodings: vec![DEFAULT_FALLBACK_ENCODING.to_string()],
        }
    }
}
