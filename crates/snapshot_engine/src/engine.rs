use std::path::PathBuf;
use std::sync::Arc;

use engine_logging::{engine_info, set_run_step};

use crate::api::{CollectionSource, PaginatedFetcher};
use crate::auth::AuthClient;
use crate::export::{write_data_script, ExportSummary};
use crate::fetch::{build_client, FetchSettings, ProgressSink};
use crate::manager::{system_clock, Clock, ReconciliationManager};
use crate::people::{JsonFileCache, PersonnelCache};
use crate::render::{RenderSettings, Renderer, StaticRenderer};
use crate::timetable::RenderedPageFetcher;
use crate::{EngineEvent, RenderError, SnapshotError, Stage};

pub const DEFAULT_API_BASE: &str = "https://api.dartmouth.edu/api";
pub const DEFAULT_TIMETABLE_URL: &str =
    "https://oracle-www.dartmouth.edu/dart/groucho/timetable.display_courses";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    /// Parse the report as served.
    Static,
    /// Run the report through headless Chromium first.
    Chromium,
}

#[derive(Clone)]
pub struct EngineConfig {
    pub api_base: String,
    pub timetable_url: String,
    pub output_path: PathBuf,
    pub people_cache: PathBuf,
    pub fetch: FetchSettings,
    pub render: RenderSettings,
    pub renderer: RendererKind,
    pub clock: Clock,
}

impl EngineConfig {
    pub fn default_with_paths(output_path: PathBuf, people_cache: PathBuf) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timetable_url: DEFAULT_TIMETABLE_URL.to_string(),
            output_path,
            people_cache,
            fetch: FetchSettings::default(),
            render: RenderSettings::default(),
            renderer: RendererKind::Chromium,
            clock: system_clock(),
        }
    }
}

/// One complete run: authenticate, gather every collection and the timetable,
/// then write the data script. Nothing is written unless every step succeeds.
pub async fn run_snapshot(
    config: &EngineConfig,
    key: &str,
    sink: Arc<dyn ProgressSink>,
) -> Result<ExportSummary, SnapshotError> {
    let renderer = build_renderer(config).await?;
    run_snapshot_with_renderer(config, key, renderer, sink).await
}

/// Same as [`run_snapshot`] with the timetable renderer supplied by the caller
/// instead of chosen from `config.renderer`.
pub async fn run_snapshot_with_renderer(
    config: &EngineConfig,
    key: &str,
    renderer: Arc<dyn Renderer>,
    sink: Arc<dyn ProgressSink>,
) -> Result<ExportSummary, SnapshotError> {
    set_run_step(Stage::Authenticating.label());
    sink.emit(EngineEvent::StageStarted(Stage::Authenticating));
    let client = build_client(&config.fetch)?;
    let token = AuthClient::new(client.clone(), &config.api_base)
        .authenticate(key)
        .await?;

    let api: Arc<dyn CollectionSource> = Arc::new(PaginatedFetcher::new(
        client.clone(),
        &config.api_base,
        token,
        config.fetch.clone(),
        sink.clone(),
    ));
    let timetable = Arc::new(RenderedPageFetcher::new(
        client,
        config.timetable_url.clone(),
        config.fetch.max_bytes,
        renderer,
    ));
    let people = PersonnelCache::new(
        Arc::new(JsonFileCache::new(config.people_cache.clone())),
        api.clone(),
    );

    let manager =
        ReconciliationManager::new(api, timetable, people, config.clock.clone(), sink.clone());
    let bundle = manager.build_bundle().await?;

    set_run_step(Stage::Writing.label());
    sink.emit(EngineEvent::StageStarted(Stage::Writing));
    let summary = write_data_script(&config.output_path, &bundle)?;
    set_run_step(Stage::Done.label());
    sink.emit(EngineEvent::StageStarted(Stage::Done));
    engine_info!(
        "Snapshot complete: {} sections, {} courses, {} people, {} timetable entries",
        summary.sections,
        summary.courses,
        summary.people,
        summary.timetable_entries
    );
    Ok(summary)
}

async fn build_renderer(config: &EngineConfig) -> Result<Arc<dyn Renderer>, RenderError> {
    match config.renderer {
        RendererKind::Static => Ok(Arc::new(StaticRenderer)),
        #[cfg(feature = "chromium")]
        RendererKind::Chromium => Ok(Arc::new(
            crate::render::ChromiumRenderer::launch(config.render.clone()).await?,
        )),
        #[cfg(not(feature = "chromium"))]
        RendererKind::Chromium => Err(RenderError::Unavailable(
            "built without the `chromium` feature".to_string(),
        )),
    }
}
