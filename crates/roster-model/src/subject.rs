//! Course (subject) records.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::id::RecordId;

/// Level assigned to subjects whose level is not known.
pub const DEFAULT_LEVEL: u32 = 1;

/// Credit hours assigned to subjects whose weight is not known.
pub const DEFAULT_CREDIT_HOURS: u32 = 3;

/// A persisted course.
///
/// `code` is the natural key shown on spreadsheets and is unique within a
/// store. `id` is assigned once by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: RecordId,
    pub name: String,
    pub code: String,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default = "default_credit_hours")]
    pub credit_hours: u32,
}

/// Subject fields before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubject {
    pub name: String,
    pub code: String,
    pub level: u32,
    pub credit_hours: u32,
}

impl NewSubject {
    /// Creates a subject with the default level and credit hours.
    ///
    /// A blank `name` falls back to the code.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let code = code.into();
        let name = name.into();
        let name = if name.trim().is_empty() {
            code.clone()
        } else {
            name
        };
        Self {
            name,
            code,
            level: DEFAULT_LEVEL,
            credit_hours: DEFAULT_CREDIT_HOURS,
        }
    }

    /// Checks the invariants stores rely on.
    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(ModelError::EmptySubjectCode);
        }
        if self.credit_hours == 0 {
            return Err(ModelError::InvalidCreditHours {
                code: self.code.clone(),
            });
        }
        Ok(())
    }

    /// Attaches a store-assigned id.
    pub fn with_id(self, id: RecordId) -> Subject {
        Subject {
            id,
            name: self.name,
            code: self.code,
            level: self.level,
            credit_hours: self.credit_hours,
        }
    }
}

fn default_level() -> u32 {
    DEFAULT_LEVEL
}

fn default_credit_hours() -> u32 {
    DEFAULT_CREDIT_HOURS
}
