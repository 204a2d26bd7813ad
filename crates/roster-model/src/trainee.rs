//! Trainee records.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::id::RecordId;

/// A persisted trainee.
///
/// `failed_subject_ids` holds the courses the trainee still has to pass.
/// The field keeps its historical name so existing documents stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trainee {
    pub id: RecordId,
    pub full_name: String,
    #[serde(default)]
    pub national_id: String,
    #[serde(default)]
    pub trainee_number: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub major: String,
    /// Kept as text to preserve formatting such as `4.50`.
    #[serde(default)]
    pub gpa: String,
    #[serde(default)]
    pub completed_hours: u32,
    #[serde(default)]
    pub remaining_hours: u32,
    #[serde(default)]
    pub passed_subject_ids: BTreeSet<RecordId>,
    #[serde(default)]
    pub failed_subject_ids: BTreeSet<RecordId>,
}

impl Trainee {
    /// Applies an update, leaving `None` fields untouched.
    pub fn apply(&mut self, patch: TraineePatch) {
        if let Some(full_name) = patch.full_name {
            self.full_name = full_name;
        }
        if let Some(phone_number) = patch.phone_number {
            self.phone_number = phone_number;
        }
        if let Some(major) = patch.major {
            self.major = major;
        }
        if let Some(passed) = patch.passed_subject_ids {
            self.passed_subject_ids = passed;
        }
        if let Some(failed) = patch.failed_subject_ids {
            self.failed_subject_ids = failed;
        }
    }

    /// Number of courses still outstanding.
    pub fn remaining_count(&self) -> usize {
        self.failed_subject_ids.len()
    }
}

/// Trainee fields before the store assigns an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrainee {
    pub full_name: String,
    pub national_id: String,
    pub trainee_number: String,
    pub phone_number: String,
    pub major: String,
    pub gpa: String,
    pub completed_hours: u32,
    pub remaining_hours: u32,
    pub passed_subject_ids: BTreeSet<RecordId>,
    pub failed_subject_ids: BTreeSet<RecordId>,
}

impl NewTrainee {
    /// Attaches a store-assigned id.
    pub fn with_id(self, id: RecordId) -> Trainee {
        Trainee {
            id,
            full_name: self.full_name,
            national_id: self.national_id,
            trainee_number: self.trainee_number,
            phone_number: self.phone_number,
            major: self.major,
            gpa: self.gpa,
            completed_hours: self.completed_hours,
            remaining_hours: self.remaining_hours,
            passed_subject_ids: self.passed_subject_ids,
            failed_subject_ids: self.failed_subject_ids,
        }
    }
}

/// Partial update for an existing trainee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraineePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passed_subject_ids: Option<BTreeSet<RecordId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_subject_ids: Option<BTreeSet<RecordId>>,
}

impl TraineePatch {
    /// Returns true if applying the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone_number.is_none()
            && self.major.is_none()
            && self.passed_subject_ids.is_none()
            && self.failed_subject_ids.is_none()
    }
}
