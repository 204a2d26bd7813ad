//! Trainee lookup by operator query.

use roster_model::{LookupField, Subject, Trainee, TraineeIndex, remaining_subjects};
use tracing::debug;

use crate::error::Result;
use crate::store::RecordStore;

/// A trainee found by [`lookup_trainee`], with the courses still owed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraineeLookup {
    pub trainee: Trainee,
    pub matched_by: LookupField,
    /// Remaining subjects ordered by level, then code.
    pub remaining: Vec<Subject>,
}

/// Finds a trainee by trainee number, national id, or phone number, in
/// that order.
///
/// A blank query finds nothing.
pub fn lookup_trainee(store: &dyn RecordStore, query: &str) -> Result<Option<TraineeLookup>> {
    if query.trim().is_empty() {
        return Ok(None);
    }
    let trainees = store.list_trainees()?;
    let index = TraineeIndex::build(&trainees);
    let Some((matched_by, id)) = index.lookup(query) else {
        debug!("no trainee matched lookup query");
        return Ok(None);
    };
    let Some(trainee) = trainees.iter().find(|t| &t.id == id).cloned() else {
        return Ok(None);
    };

    let catalogue = store.list_subjects()?;
    let remaining = remaining_subjects(&trainee, &catalogue)
        .into_iter()
        .cloned()
        .collect();
    debug!(matched_by = matched_by.label(), "trainee found");
    Ok(Some(TraineeLookup {
        trainee,
        matched_by,
        remaining,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use roster_model::{NewSubject, NewTrainee};

    #[test]
    fn test_lookup_by_each_field() {
        let store = MemoryStore::new();
        let mut advanced = NewSubject::new("ENG201", "English II");
        advanced.level = 2;
        let eng = store.create_subject(advanced).unwrap();
        let mth = store.create_subject(NewSubject::new("MTH101", "Math")).unwrap();
        store.create_subject(NewSubject::new("PHY101", "Physics")).unwrap();
        store
            .create_trainee(NewTrainee {
                full_name: "Sara".to_string(),
                national_id: "1010101010".to_string(),
                trainee_number: "44120".to_string(),
                phone_number: "0550001111".to_string(),
                failed_subject_ids: [eng.id.clone(), mth.id.clone()].into_iter().collect(),
                ..NewTrainee::default()
            })
            .unwrap();

        let found = lookup_trainee(&store, " 44120 ").unwrap().unwrap();
        assert_eq!(found.matched_by, LookupField::TraineeNumber);
        let codes: Vec<&str> = found.remaining.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["MTH101", "ENG201"]);

        let found = lookup_trainee(&store, "1010101010").unwrap().unwrap();
        assert_eq!(found.matched_by, LookupField::NationalId);
        let found = lookup_trainee(&store, "0550001111").unwrap().unwrap();
        assert_eq!(found.matched_by, LookupField::PhoneNumber);

        assert!(lookup_trainee(&store, "nobody").unwrap().is_none());
        assert!(lookup_trainee(&store, "   ").unwrap().is_none());
    }
}
