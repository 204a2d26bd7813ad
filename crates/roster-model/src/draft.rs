//! In-memory drafts accumulated while reading a spreadsheet.

use std::collections::{BTreeMap, BTreeSet};

use crate::keys::NaturalKey;
use crate::subject::NewSubject;

/// A subject seen on a spreadsheet but not yet persisted.
pub type SubjectDraft = NewSubject;

/// A trainee accumulated across one or more spreadsheet rows.
///
/// Course sets hold subject *codes*; they are resolved to subject ids
/// during reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraineeDraft {
    pub full_name: String,
    /// False when `full_name` is a placeholder built from the identity.
    pub name_from_source: bool,
    pub national_id: String,
    pub trainee_number: String,
    pub phone_number: String,
    pub major: String,
    pub gpa: String,
    pub completed_hours: u32,
    pub remaining_hours: u32,
    /// Courses already passed.
    ///
    /// Outstanding-subject rosters carry no such column, so spreadsheet
    /// extraction leaves this empty. It is filled by callers that build
    /// drafts from other sources, and an empty set never clears the passed
    /// courses of a matched trainee.
    pub passed_codes: BTreeSet<String>,
    pub outstanding_codes: BTreeSet<String>,
}

impl TraineeDraft {
    /// Natural key of the draft (trainee number, then national id).
    pub fn natural_key(&self) -> Option<NaturalKey<'_>> {
        NaturalKey::from_fields(&self.trainee_number, &self.national_id)
    }
}

/// Result of reading one spreadsheet.
///
/// Both maps are ordered so that reconciliation visits codes and
/// identities in a reproducible order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Subject drafts keyed by course code.
    pub subjects: BTreeMap<String, SubjectDraft>,
    /// Trainee drafts keyed by sanitized identity.
    pub trainees: BTreeMap<String, TraineeDraft>,
}

impl Extraction {
    /// Returns true if no trainee rows survived normalization.
    pub fn is_empty(&self) -> bool {
        self.trainees.is_empty()
    }

    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    pub fn trainee_count(&self) -> usize {
        self.trainees.len()
    }

    /// Total number of (trainee, course) pairs collected.
    pub fn outstanding_pairs(&self) -> usize {
        self.trainees
            .values()
            .map(|draft| draft.outstanding_codes.len())
            .sum()
    }
}
