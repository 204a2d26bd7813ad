//! Reconciliation of drafts against existing records.
//!
//! Planning is pure: it reads a snapshot of both collections and produces
//! the write operations. Committing then applies subject creations before
//! trainee upserts, in bounded batches, so trainees never reference a
//! subject the store has not accepted.

use std::collections::{BTreeSet, HashMap};
use std::thread;

use roster_model::{
    Extraction, NewTrainee, RecordId, Subject, Trainee, TraineeDraft, TraineeIndex, TraineePatch,
};
use roster_store::{
    Collection, DEFAULT_BATCH_SIZE, MAX_BATCH_OPERATIONS, RecordStore, StoreError, WriteBatch,
    WriteOp,
};
use tracing::{debug, info, info_span, trace, warn};

use crate::error::{ImportError, Result};
use crate::lock::store_lock;
use crate::report::{CommitProgress, ImportReport};

/// Write operations derived from one extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    pub subject_ops: Vec<WriteOp>,
    pub trainee_ops: Vec<WriteOp>,
    /// Counts known before committing; `batches_committed` is zero.
    pub report: ImportReport,
}

impl ImportPlan {
    pub fn is_empty(&self) -> bool {
        self.subject_ops.is_empty() && self.trainee_ops.is_empty()
    }
}

/// Applies extractions to a [`RecordStore`].
pub struct Reconciler<'a> {
    store: &'a dyn RecordStore,
    batch_size: usize,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Sets the number of operations per batch, clamped to what stores accept.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_OPERATIONS);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Reconciles `extraction` into the store as one unit of work.
    ///
    /// Imports into the same store are serialized from snapshot to last
    /// commit. An empty extraction returns a zero report without touching
    /// the store.
    pub fn reconcile(&self, extraction: &Extraction) -> Result<ImportReport> {
        let _span = info_span!("import", store = self.store.store_key()).entered();
        if extraction.is_empty() {
            debug!("empty extraction, store not touched");
            return Ok(ImportReport::default());
        }

        let lock = store_lock(self.store.store_key());
        let _guard = lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let (subjects, trainees) = self
            .load_snapshot()
            .map_err(|source| ImportError::StoreUnavailable { source })?;
        let plan = self.plan(extraction, &subjects, &trainees);
        let progress = self.commit(plan.subject_ops, plan.trainee_ops)?;

        let report = ImportReport {
            batches_committed: progress.batches_committed,
            ..plan.report
        };
        info!(
            subjects_created = report.subjects_created,
            subjects_reused = report.subjects_reused,
            trainees_created = report.trainees_created,
            trainees_updated = report.trainees_updated,
            unresolved_codes = report.unresolved_codes,
            batches = report.batches_committed,
            "import committed"
        );
        Ok(report)
    }

    /// Reads both collections concurrently.
    pub fn load_snapshot(&self) -> std::result::Result<(Vec<Subject>, Vec<Trainee>), StoreError> {
        let store = self.store;
        thread::scope(|scope| {
            let subjects = scope.spawn(|| store.list_subjects());
            let trainees = store.list_trainees();
            let subjects = subjects.join().unwrap_or_else(|_| {
                Err(StoreError::Unavailable {
                    reason: "subject snapshot reader panicked".to_string(),
                })
            });
            Ok((subjects?, trainees?))
        })
    }

    /// Derives the write operations for `extraction` against a snapshot.
    pub fn plan(
        &self,
        extraction: &Extraction,
        subjects: &[Subject],
        trainees: &[Trainee],
    ) -> ImportPlan {
        let mut plan = ImportPlan::default();

        let mut code_map: HashMap<&str, RecordId> = HashMap::with_capacity(subjects.len());
        for subject in subjects {
            code_map
                .entry(subject.code.as_str())
                .or_insert_with(|| subject.id.clone());
        }
        for (code, draft) in &extraction.subjects {
            if code_map.contains_key(code.as_str()) {
                plan.report.subjects_reused += 1;
                continue;
            }
            let id = self.store.allocate_id(Collection::Subjects);
            code_map.insert(code.as_str(), id.clone());
            plan.subject_ops.push(WriteOp::CreateSubject {
                id,
                subject: draft.clone(),
            });
            plan.report.subjects_created += 1;
        }

        // Several drafts can match one trainee (one by trainee number, one by
        // national id). Their writes are merged so one record gets one op.
        let mut index = TraineeIndex::build(trainees);
        let mut pending: Vec<(RecordId, PendingTrainee)> = Vec::new();
        let mut positions: HashMap<RecordId, usize> = HashMap::new();
        for draft in extraction.trainees.values() {
            let failed = resolve_codes(&draft.outstanding_codes, &code_map, &mut plan.report);
            let passed = resolve_codes(&draft.passed_codes, &code_map, &mut plan.report);

            let matched = index
                .match_keys(&draft.trainee_number, &draft.national_id)
                .cloned();
            match matched {
                Some(id) => match positions.get(&id) {
                    Some(&position) => {
                        debug!(id = %id, "roster rows for one trainee merged");
                        pending[position].1.merge(draft, passed, failed);
                    }
                    None => {
                        trace!(id = %id, "updating existing trainee");
                        positions.insert(id.clone(), pending.len());
                        pending.push((
                            id,
                            PendingTrainee::Update(update_patch(draft, passed, failed)),
                        ));
                        plan.report.trainees_updated += 1;
                    }
                },
                None => {
                    let id = self.store.allocate_id(Collection::Trainees);
                    let trainee = new_trainee(draft, passed, failed);
                    index.insert(&trainee.clone().with_id(id.clone()));
                    positions.insert(id.clone(), pending.len());
                    pending.push((id, PendingTrainee::Create(trainee)));
                    plan.report.trainees_created += 1;
                }
            }
        }
        plan.trainee_ops = pending
            .into_iter()
            .map(|(id, pending)| match pending {
                PendingTrainee::Create(trainee) => WriteOp::CreateTrainee { id, trainee },
                PendingTrainee::Update(patch) => WriteOp::UpdateTrainee { id, patch },
            })
            .collect();

        if plan.report.unresolved_codes > 0 {
            warn!(
                unresolved = plan.report.unresolved_codes,
                "course codes without a subject were dropped"
            );
        }
        plan
    }

    /// Commits subject batches, then trainee batches.
    ///
    /// A failure before anything was committed is `StoreUnavailable`;
    /// afterwards it is `BatchCommitFailed` with the progress so far.
    pub fn commit(&self, subject_ops: Vec<WriteOp>, trainee_ops: Vec<WriteOp>) -> Result<CommitProgress> {
        let mut batches = WriteBatch::chunked(subject_ops, self.batch_size);
        batches.extend(WriteBatch::chunked(trainee_ops, self.batch_size));

        let mut progress = CommitProgress {
            total_batches: batches.len(),
            ..CommitProgress::default()
        };
        let _span = info_span!("commit", batches = progress.total_batches).entered();

        for batch in batches {
            let subjects = batch.count(Collection::Subjects);
            let trainees = batch.count(Collection::Trainees);
            if let Err(source) = self.store.commit(batch) {
                warn!(
                    committed = progress.batches_committed,
                    total = progress.total_batches,
                    error = %source,
                    "batch commit failed"
                );
                return Err(if progress.batches_committed == 0 {
                    ImportError::StoreUnavailable { source }
                } else {
                    ImportError::BatchCommitFailed { progress, source }
                });
            }
            progress.batches_committed += 1;
            progress.subjects_committed += subjects;
            progress.trainees_committed += trainees;
            debug!(
                batch = progress.batches_committed,
                subjects, trainees, "batch committed"
            );
        }
        Ok(progress)
    }
}

/// The single write planned for one trainee.
enum PendingTrainee {
    Create(NewTrainee),
    Update(TraineePatch),
}

impl PendingTrainee {
    /// Folds another draft matching the same trainee into this write.
    ///
    /// Course sets are unioned. Scalar fields keep the first supplied value.
    fn merge(&mut self, draft: &TraineeDraft, passed: BTreeSet<RecordId>, failed: BTreeSet<RecordId>) {
        match self {
            Self::Create(trainee) => {
                fill_empty(&mut trainee.phone_number, &draft.phone_number);
                fill_empty(&mut trainee.major, &draft.major);
                fill_empty(&mut trainee.gpa, &draft.gpa);
                trainee.passed_subject_ids.extend(passed);
                trainee.failed_subject_ids.extend(failed);
            }
            Self::Update(patch) => {
                let next = update_patch(draft, passed, failed);
                patch.full_name = patch.full_name.take().or(next.full_name);
                patch.phone_number = patch.phone_number.take().or(next.phone_number);
                patch.major = patch.major.take().or(next.major);
                patch.passed_subject_ids =
                    union(patch.passed_subject_ids.take(), next.passed_subject_ids);
                patch.failed_subject_ids =
                    union(patch.failed_subject_ids.take(), next.failed_subject_ids);
            }
        }
    }
}

fn fill_empty(field: &mut String, value: &str) {
    if field.trim().is_empty() && !value.trim().is_empty() {
        *field = value.trim().to_string();
    }
}

fn union(
    first: Option<BTreeSet<RecordId>>,
    second: Option<BTreeSet<RecordId>>,
) -> Option<BTreeSet<RecordId>> {
    match (first, second) {
        (Some(mut first), Some(second)) => {
            first.extend(second);
            Some(first)
        }
        (first, second) => first.or(second),
    }
}

fn resolve_codes(
    codes: &BTreeSet<String>,
    code_map: &HashMap<&str, RecordId>,
    report: &mut ImportReport,
) -> BTreeSet<RecordId> {
    let mut ids = BTreeSet::new();
    for code in codes {
        match code_map.get(code.as_str()) {
            Some(id) => {
                ids.insert(id.clone());
            }
            None => report.unresolved_codes += 1,
        }
    }
    ids
}

/// Fields replaced on a matched trainee.
///
/// Outstanding courses always reflect the latest roster. Passed courses,
/// names and contact fields only overwrite when the roster supplied them.
fn update_patch(
    draft: &TraineeDraft,
    passed: BTreeSet<RecordId>,
    failed: BTreeSet<RecordId>,
) -> TraineePatch {
    TraineePatch {
        full_name: draft.name_from_source.then(|| draft.full_name.clone()),
        phone_number: non_empty(&draft.phone_number),
        major: non_empty(&draft.major),
        passed_subject_ids: (!draft.passed_codes.is_empty()).then_some(passed),
        failed_subject_ids: Some(failed),
    }
}

fn new_trainee(
    draft: &TraineeDraft,
    passed: BTreeSet<RecordId>,
    failed: BTreeSet<RecordId>,
) -> NewTrainee {
    NewTrainee {
        full_name: draft.full_name.clone(),
        national_id: draft.national_id.clone(),
        trainee_number: draft.trainee_number.clone(),
        phone_number: draft.phone_number.clone(),
        major: draft.major.clone(),
        gpa: draft.gpa.clone(),
        completed_hours: draft.completed_hours,
        remaining_hours: draft.remaining_hours,
        passed_subject_ids: passed,
        failed_subject_ids: failed,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_model::{NewSubject, SubjectDraft};
    use roster_store::MemoryStore;

    fn draft(identity: &str, codes: &[&str]) -> TraineeDraft {
        TraineeDraft {
            full_name: format!("متدرب {identity}"),
            national_id: identity.to_string(),
            trainee_number: identity.to_string(),
            outstanding_codes: codes.iter().map(|c| (*c).to_string()).collect(),
            ..TraineeDraft::default()
        }
    }

    fn extraction(drafts: &[TraineeDraft]) -> Extraction {
        let mut extraction = Extraction::default();
        for draft in drafts {
            for code in &draft.outstanding_codes {
                extraction
                    .subjects
                    .insert(code.clone(), SubjectDraft::new(code.as_str(), ""));
            }
            extraction
                .trainees
                .insert(draft.trainee_number.clone(), draft.clone());
        }
        extraction
    }

    #[test]
    fn test_plan_creates_missing_subjects_in_code_order() {
        let store = MemoryStore::new();
        let existing = store.create_subject(NewSubject::new("MTH101", "Math")).unwrap();
        let reconciler = Reconciler::new(&store);
        let extraction = extraction(&[draft("12345", &["MTH101", "ENG102", "ARB100"])]);

        let plan = reconciler.plan(&extraction, &[existing.clone()], &[]);
        let created: Vec<&str> = plan
            .subject_ops
            .iter()
            .filter_map(|op| match op {
                WriteOp::CreateSubject { subject, .. } => Some(subject.code.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(created, vec!["ARB100", "ENG102"]);
        assert_eq!(plan.report.subjects_reused, 1);
        assert_eq!(plan.report.trainees_created, 1);

        let WriteOp::CreateTrainee { trainee, .. } = &plan.trainee_ops[0] else {
            panic!("expected a trainee creation");
        };
        assert!(trainee.failed_subject_ids.contains(&existing.id));
        assert_eq!(trainee.failed_subject_ids.len(), 3);
    }

    #[test]
    fn test_unresolved_codes_are_counted() {
        let store = MemoryStore::new();
        let reconciler = Reconciler::new(&store);
        let mut extraction = extraction(&[draft("12345", &["MTH101"])]);
        extraction
            .trainees
            .get_mut("12345")
            .unwrap()
            .outstanding_codes
            .insert("GHOST1".to_string());

        let plan = reconciler.plan(&extraction, &[], &[]);
        assert_eq!(plan.report.unresolved_codes, 1);
    }

    #[test]
    fn test_update_patch_keeps_unsupplied_fields() {
        let mut placeholder = draft("777", &["MTH101"]);
        placeholder.phone_number = "  ".to_string();
        let patch = update_patch(&placeholder, BTreeSet::new(), BTreeSet::new());
        assert!(patch.full_name.is_none());
        assert!(patch.phone_number.is_none());
        assert!(patch.passed_subject_ids.is_none());
        assert_eq!(patch.failed_subject_ids, Some(BTreeSet::new()));

        let named = TraineeDraft {
            name_from_source: true,
            full_name: "سارة".to_string(),
            major: "تقنية".to_string(),
            ..placeholder
        };
        let patch = update_patch(&named, BTreeSet::new(), BTreeSet::new());
        assert_eq!(patch.full_name.as_deref(), Some("سارة"));
        assert_eq!(patch.major.as_deref(), Some("تقنية"));
    }

    #[test]
    fn test_rows_matching_one_trainee_are_merged() {
        let store = MemoryStore::new();
        let existing = NewTrainee {
            trainee_number: "A100".to_string(),
            national_id: "1010".to_string(),
            ..NewTrainee::default()
        }
        .with_id(RecordId::new("t-1").unwrap());
        let extraction = extraction(&[draft("A100", &["MTH101"]), draft("1010", &["ENG102"])]);

        let plan = Reconciler::new(&store).plan(&extraction, &[], &[existing.clone()]);
        assert_eq!(plan.report.trainees_updated, 1);
        assert_eq!(plan.report.trainees_created, 0);
        assert_eq!(plan.trainee_ops.len(), 1);
        let WriteOp::UpdateTrainee { id, patch } = &plan.trainee_ops[0] else {
            panic!("expected a trainee update");
        };
        assert_eq!(id, &existing.id);
        assert_eq!(patch.failed_subject_ids.as_ref().map(BTreeSet::len), Some(2));
    }

    #[test]
    fn test_rows_matching_a_new_trainee_join_its_creation() {
        let store = MemoryStore::new();
        let mut extraction = Extraction::default();
        for code in ["MTH101", "ENG102"] {
            extraction
                .subjects
                .insert(code.to_string(), SubjectDraft::new(code, ""));
        }
        let first = TraineeDraft {
            trainee_number: "T900".to_string(),
            national_id: "999".to_string(),
            outstanding_codes: ["MTH101".to_string()].into_iter().collect(),
            ..TraineeDraft::default()
        };
        let second = TraineeDraft {
            trainee_number: "999".to_string(),
            national_id: "999".to_string(),
            phone_number: "0550000000".to_string(),
            outstanding_codes: ["ENG102".to_string()].into_iter().collect(),
            ..TraineeDraft::default()
        };
        extraction.trainees.insert("a".to_string(), first);
        extraction.trainees.insert("b".to_string(), second);

        let plan = Reconciler::new(&store).plan(&extraction, &[], &[]);
        assert_eq!(plan.report.trainees_created, 1);
        assert_eq!(plan.report.trainees_updated, 0);
        assert_eq!(plan.trainee_ops.len(), 1);
        let WriteOp::CreateTrainee { trainee, .. } = &plan.trainee_ops[0] else {
            panic!("expected a trainee creation");
        };
        assert_eq!(trainee.trainee_number, "T900");
        assert_eq!(trainee.phone_number, "0550000000");
        assert_eq!(trainee.failed_subject_ids.len(), 2);
    }

    #[test]
    fn test_passed_courses_replace_only_when_supplied() {
        let mut with_passed = draft("777", &["MTH101"]);
        with_passed.passed_codes.insert("ARB100".to_string());
        let passed: BTreeSet<RecordId> = [RecordId::new("s-arb").unwrap()].into_iter().collect();
        let patch = update_patch(&with_passed, passed.clone(), BTreeSet::new());
        assert_eq!(patch.passed_subject_ids, Some(passed));

        let merged = union(Some(BTreeSet::new()), None);
        assert_eq!(merged, Some(BTreeSet::new()));
        assert_eq!(union(None, None), None);
    }

    #[test]
    fn test_batch_size_is_clamped() {
        let store = MemoryStore::new();
        assert_eq!(Reconciler::new(&store).with_batch_size(0).batch_size(), 1);
        assert_eq!(
            Reconciler::new(&store).with_batch_size(10_000).batch_size(),
            MAX_BATCH_OPERATIONS
        );
    }

    #[test]
    fn test_small_batches_split_commit() {
        let store = MemoryStore::new();
        let extraction = extraction(&[
            draft("11111", &["A1", "B1"]),
            draft("22222", &["C1"]),
        ]);
        let report = Reconciler::new(&store)
            .with_batch_size(2)
            .reconcile(&extraction)
            .unwrap();
        // 3 subjects -> 2 batches, 2 trainees -> 1 batch
        assert_eq!(report.batches_committed, 3);
        assert_eq!(store.list_trainees().unwrap().len(), 2);
    }
}
