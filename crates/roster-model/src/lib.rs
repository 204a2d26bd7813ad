//! Record types for the trainee roster.
//!
//! This crate defines the persisted records (subjects and trainees), the
//! transient drafts produced while importing a spreadsheet, and the small
//! amount of shared logic that every other crate needs to agree on:
//!
//! - [`RecordId`]: store-assigned identifiers
//! - [`Subject`] / [`Trainee`]: persisted records
//! - [`Extraction`]: subject and trainee drafts keyed by natural key
//! - [`TraineeIndex`]: natural-key matching with a single priority order
//! - [`remaining_subjects`] / [`filter_trainees`]: read-side queries
//!
//! # Natural keys
//!
//! A trainee is matched by trainee number first and national id second.
//! Lookups by an operator additionally fall back to the phone number, but
//! the phone number never participates in import matching.

mod draft;
mod error;
mod id;
mod keys;
mod query;
mod subject;
mod trainee;

pub use draft::{Extraction, SubjectDraft, TraineeDraft};
pub use error::{ModelError, Result};
pub use id::RecordId;
pub use keys::{LookupField, NaturalKey, TraineeIndex};
pub use query::{filter_trainees, remaining_subjects, sort_subjects};
pub use subject::{DEFAULT_CREDIT_HOURS, DEFAULT_LEVEL, NewSubject, Subject};
pub use trainee::{NewTrainee, Trainee, TraineePatch};
