use std::collections::BTreeMap;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A section as listed by `academic/sections`, before it is keyed by id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SectionRecord {
    pub id: String,
    #[serde(flatten)]
    pub section: Section,
}

/// Projection of a section kept in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub course_id: String,
    #[serde(default)]
    pub section_number: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub crn: Option<String>,
    #[serde(default)]
    pub enroll_limit: Option<i64>,
    #[serde(default)]
    pub priorities: Value,
    #[serde(default)]
    pub required_materials: Value,
    #[serde(default)]
    pub schedule: Value,
    #[serde(default)]
    pub crosslist: Value,
    pub term: SectionTerm,
    #[serde(default)]
    pub type_id: Option<String>,
    #[serde(default)]
    pub instructors: Vec<Instructor>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTerm {
    pub sis_term_code: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructor {
    pub netid: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A course as listed by `academic/courses`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CourseRecord {
    pub id: String,
    #[serde(flatten)]
    pub course: Course,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(default)]
    pub course_number: Option<String>,
    #[serde(default)]
    pub subject_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub orc_title: Option<String>,
    #[serde(default)]
    pub orc_description: Option<String>,
    #[serde(default)]
    pub prerequisites: Value,
    #[serde(default)]
    pub is_credit_nocredit: Option<bool>,
    #[serde(default)]
    pub schools: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionType {
    pub id: String,
    pub name: String,
}

/// Full personnel record as returned by the `people` collection.
///
/// Attributes the snapshot does not use are kept in `extra` so the on-disk
/// cache holds the complete record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub netid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `{name, email}` projection published in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<&Person> for PersonSummary {
    fn from(person: &Person) -> Self {
        Self {
            name: person.name.clone(),
            email: person.email.clone(),
        }
    }
}

/// Requirement and enrollment data scraped from one timetable row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimetableEntry {
    /// World-culture requirement tags.
    pub wc: Vec<String>,
    /// Distributive requirement tags.
    pub dist: Vec<String>,
    /// Language requirement, if any.
    pub lang: Option<String>,
    /// First-year seminar.
    pub fys: bool,
    /// Current enrollment.
    pub enrl: Option<u32>,
    /// Enrollment limit.
    pub lim: Option<u32>,
}

/// Everything a run publishes, keyed for deterministic output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SnapshotBundle {
    pub sections: BTreeMap<String, Section>,
    pub courses: BTreeMap<String, Course>,
    pub section_types: BTreeMap<String, String>,
    pub people: BTreeMap<String, PersonSummary>,
    pub timetable: BTreeMap<String, TimetableEntry>,
    pub cache_date: String,
}

// The API is not consistent about whether a CRN is a string or a number.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected crn as string or number, got {other}"
        ))),
    }
}
