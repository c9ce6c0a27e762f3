use engine_logging::{engine_debug, engine_info};
use snapshot_engine::{EngineEvent, ProgressSink, Stage};

/// Reports pipeline progress through the logger.
#[derive(Debug, Default)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: EngineEvent) {
        match event {
            EngineEvent::StageStarted(Stage::Done) => {}
            EngineEvent::StageStarted(stage) => engine_info!("Starting {}", stage.label()),
            EngineEvent::PageFetched(progress) => engine_debug!(
                "{} page {}: {} records ({} total)",
                progress.collection,
                progress.page,
                progress.records,
                progress.total
            ),
        }
    }
}
