//! Command implementations shared by the binary and its tests.

use std::path::Path;

use anyhow::{Context, Result};
use roster_import::{ImportOutcome, import_file};
use roster_model::{RecordId, Subject, Trainee, filter_trainees, sort_subjects};
use roster_store::{
    ClearedRecords, MemoryStore, RecordStore, StoreBackend, TraineeLookup, lookup_trainee,
};
use tracing::{info, info_span};

use crate::logging::redact_value;
use crate::settings::Settings;

/// Options for `roster import`.
#[derive(Debug, Clone, Copy)]
pub struct ImportRequest<'a> {
    pub path: &'a Path,
    /// Import into an in-memory copy of the store.
    pub dry_run: bool,
    /// Overrides `import.batch_size`.
    pub batch_size: Option<usize>,
}

/// A finished import run.
#[derive(Debug, Clone)]
pub struct ImportRun {
    pub outcome: ImportOutcome,
    pub dry_run: bool,
    /// Key of the store the records went to.
    pub store_key: String,
}

/// Opens the store selected by `settings`.
///
/// Each command runs in its own process, so the memory backend would hand
/// every command an empty store. It is refused here; `import --dry-run`
/// still copies the configured store into memory.
pub fn open_store(settings: &Settings) -> Result<Box<dyn RecordStore>> {
    let config = settings.store_config();
    if config.backend == StoreBackend::Memory {
        anyhow::bail!(
            "the memory backend keeps records only for one command; \
             set `backend = \"document\"` under [store]"
        );
    }
    config.open().context("open record store")
}

/// Writes the default settings to `path` with the document path spelled out.
///
/// An existing file is kept unless `force` is set.
pub fn init_config(path: &Path, force: bool) -> Result<Settings> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists; pass --force to overwrite it", path.display());
    }
    let mut settings = Settings::default();
    settings.store = settings.store_config();
    settings
        .save_to(path)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "settings file written");
    Ok(settings)
}

pub fn import(settings: &Settings, request: &ImportRequest<'_>) -> Result<ImportRun> {
    let span = info_span!("import_command", dry_run = request.dry_run);
    let _guard = span.enter();

    let mut options = settings.import_options().context("invalid import settings")?;
    if let Some(batch_size) = request.batch_size {
        options.batch_size = batch_size;
    }

    let store = open_store(settings)?;
    let target: Box<dyn RecordStore> = if request.dry_run {
        let copy = MemoryStore::snapshot_of(store.as_ref()).context("copy store for dry run")?;
        info!(source = store.store_key(), "dry run, writing to an in-memory copy");
        Box::new(copy)
    } else {
        store
    };

    let outcome = import_file(request.path, target.as_ref(), &options)
        .with_context(|| format!("import {}", request.path.display()))?;
    Ok(ImportRun {
        outcome,
        dry_run: request.dry_run,
        store_key: target.store_key().to_string(),
    })
}

pub fn lookup(settings: &Settings, query: &str) -> Result<Option<TraineeLookup>> {
    let store = open_store(settings)?;
    info!(query = redact_value(query.trim()), "looking up trainee");
    lookup_trainee(store.as_ref(), query).context("look up trainee")
}

/// All subjects ordered by level, then code.
pub fn list_subjects(settings: &Settings) -> Result<Vec<Subject>> {
    let store = open_store(settings)?;
    let mut subjects = store.list_subjects().context("list subjects")?;
    sort_subjects(&mut subjects);
    Ok(subjects)
}

/// Trainees in store order, optionally filtered by a search term.
pub fn list_trainees(settings: &Settings, filter: Option<&str>) -> Result<Vec<Trainee>> {
    let store = open_store(settings)?;
    let trainees = store.list_trainees().context("list trainees")?;
    match filter {
        Some(term) => Ok(filter_trainees(&trainees, term).into_iter().cloned().collect()),
        None => Ok(trainees),
    }
}

pub fn delete_subject(settings: &Settings, id: &str) -> Result<()> {
    let id = RecordId::new(id).context("invalid subject id")?;
    let store = open_store(settings)?;
    store
        .delete_subject(&id)
        .with_context(|| format!("delete subject {id}"))?;
    info!(%id, "subject deleted");
    Ok(())
}

pub fn delete_trainee(settings: &Settings, id: &str) -> Result<()> {
    let id = RecordId::new(id).context("invalid trainee id")?;
    let store = open_store(settings)?;
    store
        .delete_trainee(&id)
        .with_context(|| format!("delete trainee {id}"))?;
    info!(%id, "trainee deleted");
    Ok(())
}

pub fn clear(settings: &Settings) -> Result<ClearedRecords> {
    let store = open_store(settings)?;
    store.clear().context("clear record store")
}
