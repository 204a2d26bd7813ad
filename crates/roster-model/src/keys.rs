//! Natural-key matching for trainees.
//!
//! There is exactly one priority order, used by both import matching and
//! operator lookups:
//!
//! 1. trainee number
//! 2. national id
//!
//! Lookups (not imports) then try the phone number as a last resort, since
//! phone numbers are what trainees most often remember but are not unique
//! enough to merge records on.

use std::collections::HashMap;
use std::fmt;

use crate::id::RecordId;
use crate::trainee::Trainee;

/// The business identifier used to match a trainee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaturalKey<'a> {
    TraineeNumber(&'a str),
    NationalId(&'a str),
}

impl<'a> NaturalKey<'a> {
    /// Picks the preferred key from a trainee's fields.
    pub fn from_fields(trainee_number: &'a str, national_id: &'a str) -> Option<Self> {
        let trainee_number = trainee_number.trim();
        if !trainee_number.is_empty() {
            return Some(Self::TraineeNumber(trainee_number));
        }
        let national_id = national_id.trim();
        if !national_id.is_empty() {
            return Some(Self::NationalId(national_id));
        }
        None
    }

    pub fn value(&self) -> &'a str {
        match self {
            Self::TraineeNumber(value) | Self::NationalId(value) => value,
        }
    }
}

impl fmt::Display for NaturalKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TraineeNumber(value) => write!(f, "trainee number {value}"),
            Self::NationalId(value) => write!(f, "national id {value}"),
        }
    }
}

/// Which field satisfied a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupField {
    TraineeNumber,
    NationalId,
    PhoneNumber,
}

impl LookupField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::TraineeNumber => "trainee number",
            Self::NationalId => "national id",
            Self::PhoneNumber => "phone number",
        }
    }
}

/// Index of existing trainees by natural key.
///
/// When several trainees share a key, the first one inserted wins.
#[derive(Debug, Clone, Default)]
pub struct TraineeIndex {
    by_trainee_number: HashMap<String, RecordId>,
    by_national_id: HashMap<String, RecordId>,
    by_phone_number: HashMap<String, RecordId>,
}

impl TraineeIndex {
    pub fn build<'a>(trainees: impl IntoIterator<Item = &'a Trainee>) -> Self {
        let mut index = Self::default();
        for trainee in trainees {
            index.insert(trainee);
        }
        index
    }

    pub fn insert(&mut self, trainee: &Trainee) {
        insert_key(
            &mut self.by_trainee_number,
            &trainee.trainee_number,
            &trainee.id,
        );
        insert_key(&mut self.by_national_id, &trainee.national_id, &trainee.id);
        insert_key(
            &mut self.by_phone_number,
            &trainee.phone_number,
            &trainee.id,
        );
    }

    /// Matches an incoming record against existing trainees.
    pub fn match_keys(&self, trainee_number: &str, national_id: &str) -> Option<&RecordId> {
        let by_number = match trainee_number.trim() {
            "" => None,
            key => self.by_trainee_number.get(key),
        };
        by_number.or_else(|| match national_id.trim() {
            "" => None,
            key => self.by_national_id.get(key),
        })
    }

    /// Resolves a free-form operator query.
    pub fn lookup(&self, query: &str) -> Option<(LookupField, &RecordId)> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        if let Some(id) = self.by_trainee_number.get(query) {
            return Some((LookupField::TraineeNumber, id));
        }
        if let Some(id) = self.by_national_id.get(query) {
            return Some((LookupField::NationalId, id));
        }
        self.by_phone_number
            .get(query)
            .map(|id| (LookupField::PhoneNumber, id))
    }

    /// Number of distinct trainee numbers indexed.
    pub fn len(&self) -> usize {
        self.by_trainee_number.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_trainee_number.is_empty() && self.by_national_id.is_empty()
    }
}

fn insert_key(map: &mut HashMap<String, RecordId>, key: &str, id: &RecordId) {
    let key = key.trim();
    if key.is_empty() {
        return;
    }
    map.entry(key.to_string()).or_insert_with(|| id.clone());
}
