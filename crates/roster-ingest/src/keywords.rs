//! Keyword groups used to classify header cells.
//!
//! Header labels arrive in Arabic, English, or a mix of both, and rarely
//! match a fixed vocabulary exactly. Each semantic column role therefore has
//! a group of keywords, and a header cell belongs to a role when it
//! *contains* any of the group's keywords after lower-casing and trimming.
//!
//! The defaults cover the rosters exported by the training registry; every
//! group can be overridden from configuration.

use serde::{Deserialize, Serialize};

/// Semantic role of a spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    /// Trainee identity (trainee number or national id).
    Identity,
    /// Course code.
    CourseCode,
    /// Course display name.
    CourseName,
    /// Trainee display name.
    TraineeName,
    /// Contact phone number.
    Phone,
    /// Major / department.
    Major,
}

impl ColumnRole {
    /// Roles that must be present for a header to be usable.
    pub const REQUIRED: [ColumnRole; 2] = [ColumnRole::Identity, ColumnRole::CourseCode];

    /// Optional roles in the order they claim columns.
    ///
    /// The trainee name is resolved before the course name because the
    /// generic course-name keyword `name` also matches `student name`.
    pub const OPTIONAL: [ColumnRole; 4] = [
        ColumnRole::TraineeName,
        ColumnRole::CourseName,
        ColumnRole::Phone,
        ColumnRole::Major,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Identity => "trainee id",
            Self::CourseCode => "course code",
            Self::CourseName => "course name",
            Self::TraineeName => "trainee name",
            Self::Phone => "phone",
            Self::Major => "major",
        }
    }
}

/// Decides whether a normalized header cell belongs to a role.
///
/// Cells passed to [`HeaderClassifier::matches`] are already trimmed and
/// lower-cased.
pub trait HeaderClassifier {
    fn matches(&self, role: ColumnRole, cell: &str) -> bool;
}

/// A set of lower-cased keywords matched by substring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordGroup(Vec<String>);

impl KeywordGroup {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            keywords
                .into_iter()
                .map(|keyword| keyword.as_ref().trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
        )
    }

    /// Returns true if `cell` contains any keyword.
    pub fn matches(&self, cell: &str) -> bool {
        self.0.iter().any(|keyword| cell.contains(keyword.as_str()))
    }

    pub fn keywords(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for KeywordGroup {
    fn from(keywords: Vec<String>) -> Self {
        Self::new(keywords)
    }
}

impl From<KeywordGroup> for Vec<String> {
    fn from(group: KeywordGroup) -> Self {
        group.0
    }
}

/// Keyword groups for every column role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderKeywords {
    pub identity: KeywordGroup,
    pub course_code: KeywordGroup,
    pub course_name: KeywordGroup,
    pub trainee_name: KeywordGroup,
    pub phone: KeywordGroup,
    pub major: KeywordGroup,
}

impl HeaderKeywords {
    pub fn group(&self, role: ColumnRole) -> &KeywordGroup {
        match role {
            ColumnRole::Identity => &self.identity,
            ColumnRole::CourseCode => &self.course_code,
            ColumnRole::CourseName => &self.course_name,
            ColumnRole::TraineeName => &self.trainee_name,
            ColumnRole::Phone => &self.phone,
            ColumnRole::Major => &self.major,
        }
    }
}

impl Default for HeaderKeywords {
    fn default() -> Self {
        Self {
            identity: KeywordGroup::new([
                "رقم", "هوية", "سجل", "id", "no", "num", "student", "trainee", "المتدرب", "اكاديمي",
            ]),
            course_code: KeywordGroup::new([
                "رمز", "كود", "code", "symbol", "course", "مقرر", "مادة", "المادة",
            ]),
            course_name: KeywordGroup::new([
                "اسم المادة",
                "اسم المقرر",
                "name",
                "وصف",
                "desc",
                "title",
            ]),
            trainee_name: KeywordGroup::new(["اسم المتدرب", "student name", "full name", "الاسم"]),
            phone: KeywordGroup::new(["جوال", "هاتف", "mobile", "phone"]),
            major: KeywordGroup::new(["تخصص", "major", "department"]),
        }
    }
}

impl HeaderClassifier for HeaderKeywords {
    fn matches(&self, role: ColumnRole, cell: &str) -> bool {
        self.group(role).matches(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_group_normalizes() {
        let group = KeywordGroup::new(["  Code ", "", "رمز"]);
        assert_eq!(group.keywords(), &["code".to_string(), "رمز".to_string()]);
        assert!(group.matches("course code"));
        assert!(group.matches("رمز المقرر"));
        assert!(!group.matches("grade"));
    }

    #[test]
    fn test_default_keywords_cover_arabic_and_english() {
        let keywords = HeaderKeywords::default();
        assert!(keywords.matches(ColumnRole::Identity, "رقم المتدرب"));
        assert!(keywords.matches(ColumnRole::Identity, "student id"));
        assert!(keywords.matches(ColumnRole::CourseCode, "رمز المقرر"));
        assert!(keywords.matches(ColumnRole::Phone, "رقم الجوال"));
        assert!(!keywords.matches(ColumnRole::CourseCode, "grade"));
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let keywords: HeaderKeywords =
            serde_json::from_str(r#"{"major": ["Program"]}"#).unwrap();
        assert!(keywords.matches(ColumnRole::Major, "program"));
        assert!(keywords.matches(ColumnRole::Identity, "trainee no"));
    }
}
