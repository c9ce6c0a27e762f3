//! Pure rules for joining the API collections into a snapshot.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::model::{
    Course, CourseRecord, Person, PersonSummary, Section, SectionRecord, SectionType,
};

/// Timestamp layout the API expects in filter expressions.
pub const FILTER_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Filter selecting sections whose offering and assessment windows both end at
/// or after `now`.
pub fn active_sections_filter(now: DateTime<Utc>) -> String {
    let stamp = now.format(FILTER_TIMESTAMP_FORMAT);
    format!("end_date=>{stamp}&course_assessment.end_date=>{stamp}")
}

/// Keys sections by id. A later record with the same id replaces an earlier one.
pub fn index_sections(records: Vec<SectionRecord>) -> BTreeMap<String, Section> {
    records
        .into_iter()
        .map(|record| (record.id, record.section))
        .collect()
}

/// Keeps only the courses referenced by at least one section.
pub fn retain_referenced_courses(
    sections: &BTreeMap<String, Section>,
    courses: Vec<CourseRecord>,
) -> BTreeMap<String, Course> {
    let referenced: BTreeSet<&str> = sections.values().map(|s| s.course_id.as_str()).collect();
    courses
        .into_iter()
        .filter(|record| referenced.contains(record.id.as_str()))
        .map(|record| (record.id, record.course))
        .collect()
}

pub fn section_type_names(types: Vec<SectionType>) -> BTreeMap<String, String> {
    types.into_iter().map(|t| (t.id, t.name)).collect()
}

/// Union of instructor netids across all sections.
pub fn instructor_netids(sections: &BTreeMap<String, Section>) -> BTreeSet<String> {
    sections
        .values()
        .flat_map(|section| section.instructors.iter())
        .map(|instructor| instructor.netid.clone())
        .collect()
}

/// Union of term codes across all sections, in ascending order.
pub fn term_codes(sections: &BTreeMap<String, Section>) -> BTreeSet<String> {
    sections
        .values()
        .map(|section| section.term.sis_term_code.clone())
        .collect()
}

pub fn index_people(people: Vec<Person>) -> BTreeMap<String, Person> {
    people
        .into_iter()
        .map(|person| (person.netid.clone(), person))
        .collect()
}

/// Ids in `required` that the snapshot cannot answer.
pub fn missing_ids<'a>(
    snapshot: &BTreeMap<String, Person>,
    required: &'a BTreeSet<String>,
) -> Vec<&'a str> {
    required
        .iter()
        .filter(|id| !snapshot.contains_key(id.as_str()))
        .map(String::as_str)
        .collect()
}

/// A refresh is needed when there is no snapshot or any required id is absent.
pub fn needs_refresh(
    snapshot: Option<&BTreeMap<String, Person>>,
    required: &BTreeSet<String>,
) -> bool {
    match snapshot {
        None => true,
        Some(snapshot) => !missing_ids(snapshot, required).is_empty(),
    }
}

/// Projects the required subset of the snapshot to `{name, email}`.
pub fn select_people(
    snapshot: &BTreeMap<String, Person>,
    required: &BTreeSet<String>,
) -> BTreeMap<String, PersonSummary> {
    snapshot
        .iter()
        .filter(|(netid, _)| required.contains(netid.as_str()))
        .map(|(netid, person)| (netid.clone(), PersonSummary::from(person)))
        .collect()
}
