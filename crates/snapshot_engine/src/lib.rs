//! Snapshot engine: API and timetable acquisition, reconciliation and export.
mod api;
mod auth;
mod decode;
mod engine;
mod export;
mod extract;
mod fetch;
mod manager;
mod people;
mod persist;
mod render;
mod timetable;
mod types;

pub use api::{decode_records, CollectionSource, PaginatedFetcher, CONTINUATION_HEADER};
pub use auth::{AuthClient, BearerToken};
pub use decode::{decode_report, DecodedReport};
pub use engine::{
    run_snapshot, run_snapshot_with_renderer, EngineConfig, RendererKind, DEFAULT_API_BASE,
    DEFAULT_TIMETABLE_URL,
};
pub use export::{render_data_script, write_data_script, ExportError, ExportSummary};
pub use extract::TableExtractor;
pub use fetch::{build_client, FetchSettings, NullProgressSink, ProgressSink};
pub use manager::{
    system_clock, Clock, ReconciliationManager, COURSES_COLLECTION, SECTIONS_COLLECTION,
    SECTION_TYPES_COLLECTION,
};
pub use people::{CacheRepository, JsonFileCache, PersonnelCache, PEOPLE_COLLECTION};
pub use persist::{ensure_output_dir, write_atomic, PersistError};
#[cfg(feature = "chromium")]
pub use render::ChromiumRenderer;
pub use render::{with_base_href, RenderSettings, Renderer, StaticRenderer};
pub use timetable::{RenderedPageFetcher, TimetableSource};
pub use types::{
    AuthError, CacheError, EngineEvent, FailureKind, FetchError, PageProgress, ParseError,
    RenderError, SnapshotError, Stage,
};
