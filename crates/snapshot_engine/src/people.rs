use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};
use snapshot_core::{index_people, missing_ids, needs_refresh, select_people, Person, PersonSummary};

use crate::api::{decode_records, CollectionSource};
use crate::persist::write_atomic;
use crate::{CacheError, SnapshotError};

/// Collection holding every person the API knows about.
pub const PEOPLE_COLLECTION: &str = "people";

/// Durable storage for the personnel snapshot, keyed by netid.
pub trait CacheRepository: Send + Sync {
    /// `Ok(None)` when there is no usable snapshot.
    fn load(&self) -> Result<Option<BTreeMap<String, Person>>, CacheError>;
    fn save(&self, snapshot: &BTreeMap<String, Person>) -> Result<(), CacheError>;
}

/// Snapshot stored as one JSON object, rewritten atomically.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    path: PathBuf,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheRepository for JsonFileCache {
    fn load(&self) -> Result<Option<BTreeMap<String, Person>>, CacheError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_str(&content) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) => {
                engine_warn!("Ignoring unreadable personnel cache {:?}: {}", self.path, err);
                Ok(None)
            }
        }
    }

    fn save(&self, snapshot: &BTreeMap<String, Person>) -> Result<(), CacheError> {
        let content = serde_json::to_string(snapshot)?;
        write_atomic(&self.path, &content)?;
        Ok(())
    }
}

/// Resolves netids to people, refetching the whole collection when the cached
/// snapshot cannot answer every required id.
pub struct PersonnelCache {
    repository: Arc<dyn CacheRepository>,
    source: Arc<dyn CollectionSource>,
}

impl PersonnelCache {
    pub fn new(repository: Arc<dyn CacheRepository>, source: Arc<dyn CollectionSource>) -> Self {
        Self { repository, source }
    }

    pub async fn resolve(
        &self,
        required: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, PersonSummary>, SnapshotError> {
        let cached = self.repository.load()?;

        let snapshot = if needs_refresh(cached.as_ref(), required) {
            match cached.as_ref() {
                Some(snapshot) => engine_info!(
                    "Personnel cache misses {} of {} netids; refetching",
                    missing_ids(snapshot, required).len(),
                    required.len()
                ),
                None => engine_info!("No personnel cache; fetching"),
            }
            let records = self.source.fetch(PEOPLE_COLLECTION, "").await?;
            index_people(decode_records(PEOPLE_COLLECTION, records)?)
        } else {
            engine_info!("Personnel cache covers all {} netids", required.len());
            cached.unwrap_or_default()
        };

        let still_missing = missing_ids(&snapshot, required);
        if !still_missing.is_empty() {
            engine_warn!(
                "{} instructor netids are unknown to the people collection: {:?}",
                still_missing.len(),
                still_missing
            );
        }

        self.repository.save(&snapshot)?;
        Ok(select_people(&snapshot, required))
    }
}
