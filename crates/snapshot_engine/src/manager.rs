use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use engine_logging::{engine_debug, engine_info, engine_warn, set_run_step};
use snapshot_core::{
    active_sections_filter, index_sections, instructor_netids, retain_referenced_courses,
    section_type_names, term_codes, CourseRecord, SectionRecord, SectionType, SnapshotBundle,
    TimetableQuery,
};

use crate::api::{decode_records, CollectionSource};
use crate::fetch::ProgressSink;
use crate::people::PersonnelCache;
use crate::timetable::TimetableSource;
use crate::{EngineEvent, SnapshotError, Stage};

pub const SECTIONS_COLLECTION: &str = "academic/sections";
pub const COURSES_COLLECTION: &str = "academic/courses";
pub const SECTION_TYPES_COLLECTION: &str = "academic/section_types";

/// Wall clock used for the active-section filter and the cache date.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Drives every source in order and joins the results into one bundle.
/// The first failure aborts the run.
pub struct ReconciliationManager {
    api: Arc<dyn CollectionSource>,
    timetable: Arc<dyn TimetableSource>,
    people: PersonnelCache,
    clock: Clock,
    sink: Arc<dyn ProgressSink>,
}

impl ReconciliationManager {
    pub fn new(
        api: Arc<dyn CollectionSource>,
        timetable: Arc<dyn TimetableSource>,
        people: PersonnelCache,
        clock: Clock,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            api,
            timetable,
            people,
            clock,
            sink,
        }
    }

    fn enter(&self, stage: Stage) {
        set_run_step(stage.label());
        self.sink.emit(EngineEvent::StageStarted(stage));
    }

    pub async fn build_bundle(&self) -> Result<SnapshotBundle, SnapshotError> {
        let now = (self.clock)();

        self.enter(Stage::Sections);
        let raw = self
            .api
            .fetch(SECTIONS_COLLECTION, &active_sections_filter(now))
            .await?;
        let sections = index_sections(decode_records::<SectionRecord>(SECTIONS_COLLECTION, raw)?);
        engine_info!("Retained {} active sections", sections.len());

        self.enter(Stage::Courses);
        let raw = self.api.fetch(COURSES_COLLECTION, "").await?;
        let courses = retain_referenced_courses(
            &sections,
            decode_records::<CourseRecord>(COURSES_COLLECTION, raw)?,
        );
        let dangling = sections
            .values()
            .filter(|s| !courses.contains_key(&s.course_id))
            .count();
        if dangling > 0 {
            engine_warn!("{} sections reference a course the API did not list", dangling);
        }
        engine_info!("Retained {} referenced courses", courses.len());

        self.enter(Stage::SectionTypes);
        let raw = self.api.fetch(SECTION_TYPES_COLLECTION, "").await?;
        let section_types =
            section_type_names(decode_records::<SectionType>(SECTION_TYPES_COLLECTION, raw)?);

        self.enter(Stage::People);
        let people = self.people.resolve(&instructor_netids(&sections)).await?;

        self.enter(Stage::Timetable);
        let query = TimetableQuery::new(term_codes(&sections));
        let timetable = self.timetable.fetch_timetable(&query).await?;
        let live_crns: BTreeSet<&str> =
            sections.values().filter_map(|s| s.crn.as_deref()).collect();
        let orphans = timetable
            .keys()
            .filter(|crn| !live_crns.contains(crn.as_str()))
            .count();
        engine_debug!("{} timetable entries match no active section", orphans);

        Ok(SnapshotBundle {
            sections,
            courses,
            section_types,
            people,
            timetable,
            cache_date: now.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
        })
    }
}
