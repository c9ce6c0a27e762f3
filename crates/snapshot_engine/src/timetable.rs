use std::collections::BTreeMap;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_info};
use reqwest::header::CONTENT_TYPE;
use snapshot_core::{TimetableEntry, TimetableQuery};

use crate::decode::decode_report;
use crate::extract::TableExtractor;
use crate::fetch::{ensure_success, map_reqwest_error, parse_url, read_body};
use crate::render::Renderer;
use crate::{RenderError, SnapshotError};

/// Source of per-CRN timetable entries for a set of terms.
#[async_trait::async_trait]
pub trait TimetableSource: Send + Sync {
    async fn fetch_timetable(
        &self,
        query: &TimetableQuery,
    ) -> Result<BTreeMap<String, TimetableEntry>, SnapshotError>;
}

/// Submits the timetable search form and renders the answer.
pub struct RenderedPageFetcher {
    client: reqwest::Client,
    url: String,
    max_bytes: u64,
    renderer: Arc<dyn Renderer>,
    extractor: TableExtractor,
}

impl RenderedPageFetcher {
    pub fn new(
        client: reqwest::Client,
        url: impl Into<String>,
        max_bytes: u64,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            max_bytes,
            renderer,
            extractor: TableExtractor,
        }
    }

    /// POSTs the form for `query` and returns the rendered document.
    pub async fn fetch_rendered(&self, query: &TimetableQuery) -> Result<String, RenderError> {
        let url = parse_url(&self.url)?;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query.form_fields())
            .finish();
        engine_debug!("POST {} terms={:?}", url, query.terms);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(&response)?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        let bytes = read_body(response, self.max_bytes).await?;
        let decoded = decode_report(&bytes, content_type.as_deref());
        engine_debug!(
            "Report body {} bytes decoded as {}",
            bytes.len(),
            decoded.encoding_label
        );

        self.renderer.render(&decoded.html, &self.url).await
    }
}

#[async_trait::async_trait]
impl TimetableSource for RenderedPageFetcher {
    async fn fetch_timetable(
        &self,
        query: &TimetableQuery,
    ) -> Result<BTreeMap<String, TimetableEntry>, SnapshotError> {
        let document = self.fetch_rendered(query).await?;
        let entries = self.extractor.extract(&document)?;
        engine_info!("Timetable has {} entries for {} terms", entries.len(), query.terms.len());
        Ok(entries)
    }
}
