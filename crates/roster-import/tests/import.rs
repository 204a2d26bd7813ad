use std::sync::atomic::{AtomicUsize, Ordering};

use insta::assert_snapshot;
use roster_import::{ImportError, ImportOptions, ImportOutcome, run_import};
use roster_model::{NewTrainee, RecordId, Subject, Trainee};
use roster_store::{
    Collection, DocumentStore, MemoryStore, RecordStore, Result as StoreResult, StoreError,
    WriteBatch,
};
use tempfile::TempDir;

const REFERENCE_ROSTER: &str =
    "رقم المتدرب,رمز المقرر\n12345,MTH101\n12345,ENG102\n99,MTH101\n";

fn import(store: &dyn RecordStore, csv: &str) -> ImportOutcome {
    run_import(csv.as_bytes(), store, &ImportOptions::default()).expect("import")
}

fn codes_of(trainee: &Trainee, subjects: &[Subject]) -> Vec<String> {
    let mut codes: Vec<String> = subjects
        .iter()
        .filter(|s| trainee.failed_subject_ids.contains(&s.id))
        .map(|s| s.code.clone())
        .collect();
    codes.sort();
    codes
}

/// Rejects commits once `fail_after` batches have gone through, or any
/// batch that writes trainees when `reject_trainees` is set.
struct FailingStore {
    inner: MemoryStore,
    commits: AtomicUsize,
    fail_after: usize,
    reject_trainees: bool,
}

impl FailingStore {
    fn rejecting_trainees() -> Self {
        Self {
            inner: MemoryStore::new(),
            commits: AtomicUsize::new(0),
            fail_after: usize::MAX,
            reject_trainees: true,
        }
    }

    fn failing_after(fail_after: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            commits: AtomicUsize::new(0),
            fail_after,
            reject_trainees: false,
        }
    }
}

impl RecordStore for FailingStore {
    fn store_key(&self) -> &str {
        self.inner.store_key()
    }

    fn list_subjects(&self) -> StoreResult<Vec<Subject>> {
        self.inner.list_subjects()
    }

    fn list_trainees(&self) -> StoreResult<Vec<Trainee>> {
        self.inner.list_trainees()
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        let attempt = self.commits.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.fail_after
            || (self.reject_trainees && batch.count(Collection::Trainees) > 0)
        {
            return Err(StoreError::Unavailable {
                reason: "connection reset".to_string(),
            });
        }
        self.inner.commit(batch)
    }

    fn delete_subject(&self, id: &RecordId) -> StoreResult<()> {
        self.inner.delete_subject(id)
    }

    fn delete_trainee(&self, id: &RecordId) -> StoreResult<()> {
        self.inner.delete_trainee(id)
    }
}

#[test]
fn reference_roster_imports_one_trainee_and_two_subjects() {
    let store = MemoryStore::new();
    let outcome = import(&store, REFERENCE_ROSTER);

    let ImportOutcome::Imported { sheet, report } = outcome else {
        panic!("expected an import, got {outcome:?}");
    };
    assert_eq!(sheet.header_row, 0);
    assert_eq!(sheet.stats.skipped_rows(), 1);
    assert_snapshot!(report, @"subjects: 2 created, 0 reused; trainees: 1 created, 0 updated; 0 unresolved codes; 2 batches committed");

    let subjects = store.list_subjects().expect("subjects");
    let trainees = store.list_trainees().expect("trainees");
    assert_eq!(trainees.len(), 1);
    assert_eq!(trainees[0].trainee_number, "12345");
    assert_eq!(trainees[0].full_name, "متدرب 12345");
    assert_eq!(codes_of(&trainees[0], &subjects), vec!["ENG102", "MTH101"]);
}

#[test]
fn reimport_creates_no_duplicates() {
    let store = MemoryStore::new();
    import(&store, REFERENCE_ROSTER);
    let outcome = import(&store, REFERENCE_ROSTER);

    let report = outcome.report().expect("report");
    assert_eq!(report.subjects_created, 0);
    assert_eq!(report.subjects_reused, 2);
    assert_eq!(report.trainees_created, 0);
    assert_eq!(report.trainees_updated, 1);
    assert_eq!(store.list_subjects().expect("subjects").len(), 2);
    assert_eq!(store.list_trainees().expect("trainees").len(), 1);
}

#[test]
fn existing_trainee_is_updated_in_place() {
    let store = MemoryStore::new();
    let existing = store
        .create_trainee(NewTrainee {
            full_name: "Sara Ahmed".to_string(),
            trainee_number: "777".to_string(),
            phone_number: "0550001111".to_string(),
            ..NewTrainee::default()
        })
        .expect("seed trainee");

    import(&store, "Trainee No,Course Code\n777,CS101\n");

    let trainees = store.list_trainees().expect("trainees");
    assert_eq!(trainees.len(), 1);
    let updated = &trainees[0];
    assert_eq!(updated.id, existing.id);
    assert_eq!(updated.full_name, "Sara Ahmed");
    assert_eq!(updated.phone_number, "0550001111");
    let subjects = store.list_subjects().expect("subjects");
    assert_eq!(codes_of(updated, &subjects), vec!["CS101"]);
}

#[test]
fn trainee_matched_by_national_id() {
    let store = MemoryStore::new();
    let existing = store
        .create_trainee(NewTrainee {
            national_id: "1010101010".to_string(),
            trainee_number: "44120".to_string(),
            ..NewTrainee::default()
        })
        .expect("seed trainee");

    let outcome = import(&store, "رقم الهوية,رمز المقرر\n1010101010,MTH101\n");
    assert_eq!(outcome.report().expect("report").trainees_updated, 1);
    assert_eq!(store.list_trainees().expect("trainees")[0].id, existing.id);
}

#[test]
fn rows_reaching_one_trainee_by_different_keys_keep_all_courses() {
    let store = MemoryStore::new();
    let existing = store
        .create_trainee(NewTrainee {
            trainee_number: "A100".to_string(),
            national_id: "1010".to_string(),
            ..NewTrainee::default()
        })
        .expect("seed trainee");

    let outcome = import(&store, "رقم المتدرب,رمز المقرر\nA100,MTH101\n1010,ENG102\n");
    let report = outcome.report().expect("report");
    assert_eq!(report.trainees_updated, 1);
    assert_eq!(report.trainees_created, 0);

    let trainees = store.list_trainees().expect("trainees");
    assert_eq!(trainees.len(), 1);
    assert_eq!(trainees[0].id, existing.id);
    let subjects = store.list_subjects().expect("subjects");
    assert_eq!(codes_of(&trainees[0], &subjects), vec!["ENG102", "MTH101"]);
}

#[test]
fn failure_after_subjects_is_partial() {
    let store = FailingStore::rejecting_trainees();
    let err = run_import(REFERENCE_ROSTER.as_bytes(), &store, &ImportOptions::default())
        .unwrap_err();

    assert!(err.is_partial());
    let ImportError::BatchCommitFailed { progress, .. } = &err else {
        panic!("expected BatchCommitFailed, got {err:?}");
    };
    assert_eq!(progress.batches_committed, 1);
    assert_eq!(progress.total_batches, 2);
    assert_eq!(progress.subjects_committed, 2);
    assert_eq!(progress.trainees_committed, 0);
    assert_eq!(store.list_subjects().expect("subjects").len(), 2);
    assert!(store.list_trainees().expect("trainees").is_empty());

    // Retrying against a healthy store reuses the committed subjects.
    let outcome = import(&store.inner, REFERENCE_ROSTER);
    assert_eq!(outcome.report().expect("report").subjects_reused, 2);
    assert_eq!(store.list_trainees().expect("trainees").len(), 1);
}

#[test]
fn first_batch_failure_is_store_unavailable() {
    let store = FailingStore::failing_after(0);
    let err = run_import(REFERENCE_ROSTER.as_bytes(), &store, &ImportOptions::default())
        .unwrap_err();
    assert!(matches!(err, ImportError::StoreUnavailable { .. }));
    assert!(!err.is_partial());
    assert!(store.list_subjects().expect("subjects").is_empty());
}

#[test]
fn header_without_rows_is_nothing_to_import() {
    let store = FailingStore::failing_after(0);
    let outcome = import(&store, "رقم المتدرب,رمز المقرر\n12,M\n");
    let ImportOutcome::NothingToImport { sheet } = outcome else {
        panic!("expected nothing to import, got {outcome:?}");
    };
    assert_eq!(sheet.stats.data_rows, 1);
    assert_eq!(store.commits.load(Ordering::SeqCst), 0);
}

#[test]
fn document_store_reimport_across_handles() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("roster.json");

    let first = DocumentStore::open(&path).expect("open");
    import(&first, REFERENCE_ROSTER);
    drop(first);

    let second = DocumentStore::open(&path).expect("reopen");
    let outcome = import(&second, "رقم المتدرب,رمز المقرر\n12345,PHY103\n");
    let report = outcome.report().expect("report");
    assert_eq!(report.subjects_created, 1);
    assert_eq!(report.trainees_updated, 1);

    let trainees = second.list_trainees().expect("trainees");
    assert_eq!(trainees.len(), 1);
    let subjects = second.list_subjects().expect("subjects");
    assert_eq!(codes_of(&trainees[0], &subjects), vec!["PHY103"]);
}
