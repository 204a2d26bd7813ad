//! Read-side queries over loaded records.

use crate::subject::Subject;
use crate::trainee::Trainee;

/// Returns the catalogue subjects a trainee still has to pass.
///
/// Older documents stored course codes rather than subject ids in
/// `failed_subject_ids`, so a subject matches on either. Results are
/// ordered by level, then code.
pub fn remaining_subjects<'a>(trainee: &Trainee, catalogue: &'a [Subject]) -> Vec<&'a Subject> {
    let mut remaining: Vec<&Subject> = catalogue
        .iter()
        .filter(|subject| {
            trainee
                .failed_subject_ids
                .iter()
                .any(|entry| entry == &subject.id || entry.as_str() == subject.code)
        })
        .collect();
    remaining.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.code.cmp(&b.code)));
    remaining
}

/// Sorts subjects for display: by level, then code.
pub fn sort_subjects(subjects: &mut [Subject]) {
    subjects.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.code.cmp(&b.code)));
}

/// Filters trainees by a substring of name, national id, trainee number or phone.
///
/// An empty term keeps every trainee.
pub fn filter_trainees<'a>(trainees: &'a [Trainee], term: &str) -> Vec<&'a Trainee> {
    let term = term.trim();
    trainees
        .iter()
        .filter(|trainee| {
            term.is_empty()
                || trainee.full_name.contains(term)
                || trainee.national_id.contains(term)
                || trainee.trainee_number.contains(term)
                || trainee.phone_number.contains(term)
        })
        .collect()
}
