use std::fmt;
use std::time::Duration;

use crate::export::ExportError;
use crate::persist::PersistError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Authenticating,
    Sections,
    Courses,
    SectionTypes,
    People,
    Timetable,
    Writing,
    Done,
}

impl Stage {
    /// Short label used as the log prefix while the stage runs.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Authenticating => "auth",
            Stage::Sections => "sections",
            Stage::Courses => "courses",
            Stage::SectionTypes => "section_types",
            Stage::People => "people",
            Stage::Timetable => "timetable",
            Stage::Writing => "writing",
            Stage::Done => "done",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageProgress {
    pub collection: String,
    pub page: u32,
    pub records: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    StageStarted(Stage),
    PageFetched(PageProgress),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    InvalidBody,
    MissingContinuationKey,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::InvalidBody => write!(f, "invalid response body"),
            FailureKind::MissingContinuationKey => write!(f, "missing continuation key"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token exchange rejected with http status {0}")]
    Rejected(u16),
    #[error("token exchange failed: {0}")]
    Transport(#[from] FetchError),
    #[error("token exchange response has no jwt")]
    MissingToken,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("timetable form submission failed: {0}")]
    Submit(#[from] FetchError),
    #[error("renderer unavailable: {0}")]
    Unavailable(String),
    #[error("rendering failed: {0}")]
    Engine(String),
    #[error("rendering did not settle within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing course table (<div class='data-table'>)")]
    MissingTable,
    #[error("invalid selector {selector}: {message}")]
    Selector { selector: String, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cache persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Any failure that aborts a snapshot run.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("timetable render failed: {0}")]
    Render(#[from] RenderError),
    #[error("timetable parse failed: {0}")]
    Parse(#[from] ParseError),
    #[error("personnel cache failed: {0}")]
    Cache(#[from] CacheError),
    #[error("writing the data script failed: {0}")]
    Export(#[from] ExportError),
}
