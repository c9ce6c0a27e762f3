use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use snapshot_core::SnapshotBundle;

use crate::persist::{write_atomic, PersistError};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub sections: usize,
    pub courses: usize,
    pub people: usize,
    pub timetable_entries: usize,
    pub output_path: PathBuf,
}

/// Renders the bundle as the script the frontend loads: an `API` object with
/// the academic collections, people and cache date, then a `Timetable` object.
pub fn render_data_script(bundle: &SnapshotBundle) -> Result<String, ExportError> {
    let sections = serde_json::to_string(&bundle.sections)?;
    let section_types = serde_json::to_string(&bundle.section_types)?;
    let courses = serde_json::to_string(&bundle.courses)?;
    let people = serde_json::to_string(&bundle.people)?;
    let timetable = serde_json::to_string(&bundle.timetable)?;
    let cache_date = bundle.cache_date.replace('\\', "\\\\").replace('\'', "\\'");

    let mut buffer = String::new();
    buffer.push_str("const API = {\n");
    buffer.push_str("\t academic: {\n");
    buffer.push_str(&format!("\t\t sections: {sections},\n"));
    buffer.push_str(&format!("\t\t section_types: {section_types},\n"));
    buffer.push_str(&format!("\t\t courses: {courses}\n"));
    buffer.push_str("\t },\n");
    buffer.push_str(&format!("\t people: {people},\n"));
    buffer.push_str(&format!("\t cache_date: '{cache_date}'\n"));
    buffer.push_str("};\n");
    buffer.push_str(&format!("const Timetable = {timetable};\n"));
    Ok(buffer)
}

/// Writes the data script to `target`, replacing any previous file atomically.
pub fn write_data_script(
    target: &Path,
    bundle: &SnapshotBundle,
) -> Result<ExportSummary, ExportError> {
    let script = render_data_script(bundle)?;
    let output_path = write_atomic(target, &script)?;
    engine_info!("Wrote {} bytes to {:?}", script.len(), output_path);
    Ok(ExportSummary {
        sections: bundle.sections.len(),
        courses: bundle.courses.len(),
        people: bundle.people.len(),
        timetable_entries: bundle.timetable.len(),
        output_path,
    })
}
