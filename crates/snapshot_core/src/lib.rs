//! Snapshot core: typed records and the pure rules that join them.
mod model;
mod reconcile;
mod timetable;

pub use model::{
    Course, CourseRecord, Instructor, Person, PersonSummary, Section, SectionRecord, SectionTerm,
    SectionType, SnapshotBundle, TimetableEntry,
};
pub use reconcile::{
    active_sections_filter, index_people, index_sections, instructor_netids, missing_ids,
    needs_refresh, retain_referenced_courses, section_type_names, select_people, term_codes,
    FILTER_TIMESTAMP_FORMAT,
};
pub use timetable::{
    chunk_rows, clean_cell, crn_from_href, parse_count, parse_flag, parse_language,
    split_distributives, split_tags, TimetableColumn, TimetableQuery, CRN_COLUMN,
    CRN_LINK_SUFFIX_LEN,
};
