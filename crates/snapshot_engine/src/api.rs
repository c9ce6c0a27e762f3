use std::sync::Arc;

use engine_logging::{engine_debug, engine_info};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::BearerToken;
use crate::fetch::{
    ensure_success, map_reqwest_error, parse_url, read_body, FetchSettings, ProgressSink,
};
use crate::{EngineEvent, FailureKind, FetchError, PageProgress};

/// Response header whose value on the first page becomes the continuation key.
pub const CONTINUATION_HEADER: &str = "x-request-id";

/// Source of flat record lists for a named API collection.
#[async_trait::async_trait]
pub trait CollectionSource: Send + Sync {
    async fn fetch(&self, collection: &str, filter: &str) -> Result<Vec<Value>, FetchError>;
}

/// Walks a collection page by page until the API returns an empty page.
pub struct PaginatedFetcher {
    client: reqwest::Client,
    api_base: String,
    token: BearerToken,
    settings: FetchSettings,
    sink: Arc<dyn ProgressSink>,
}

impl PaginatedFetcher {
    pub fn new(
        client: reqwest::Client,
        api_base: &str,
        token: BearerToken,
        settings: FetchSettings,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            settings,
            sink,
        }
    }

    // The first page is written `page1`, without `=`. The server accepts it and
    // the continuation key carries the filter from then on.
    fn page_url(
        &self,
        collection: &str,
        filter: &str,
        page: u32,
        continuation_key: Option<&str>,
    ) -> String {
        let size = self.settings.page_size;
        match continuation_key {
            None => format!("{}/{collection}?{filter}&pagesize={size}&page{page}", self.api_base),
            Some(key) => format!(
                "{}/{collection}?continuation_key={key}&pagesize={size}&page={page}",
                self.api_base
            ),
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<(Vec<Value>, Option<String>), FetchError> {
        let parsed = parse_url(url)?;
        let response = self
            .client
            .get(parsed)
            .header(AUTHORIZATION, self.token.header_value())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(&response)?;

        let continuation_key = response
            .headers()
            .get(CONTINUATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);

        let body = read_body(response, self.settings.max_bytes).await?;
        let records: Vec<Value> = serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(FailureKind::InvalidBody, format!("{url}: {err}")))?;
        Ok((records, continuation_key))
    }
}

#[async_trait::async_trait]
impl CollectionSource for PaginatedFetcher {
    async fn fetch(&self, collection: &str, filter: &str) -> Result<Vec<Value>, FetchError> {
        let mut results = Vec::new();
        let mut continuation_key: Option<String> = None;
        let mut page: u32 = 1;

        loop {
            let url = self.page_url(collection, filter, page, continuation_key.as_deref());
            engine_debug!("GET {}", url);
            let (records, header_key) = self.fetch_page(&url).await?;

            let count = records.len();
            results.extend(records);
            self.sink.emit(EngineEvent::PageFetched(PageProgress {
                collection: collection.to_string(),
                page,
                records: count,
                total: results.len(),
            }));

            if count == 0 {
                break;
            }
            if page == 1 {
                continuation_key = Some(header_key.ok_or_else(|| {
                    FetchError::new(
                        FailureKind::MissingContinuationKey,
                        format!("{collection}: first page has no {CONTINUATION_HEADER} header"),
                    )
                })?);
            }
            page += 1;
        }

        engine_info!("Fetched {} records from {} in {} pages", results.len(), collection, page);
        Ok(results)
    }
}

/// Deserializes raw collection records into typed records.
pub fn decode_records<T: DeserializeOwned>(
    collection: &str,
    records: Vec<Value>,
) -> Result<Vec<T>, FetchError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value(record).map_err(|err| {
                FetchError::new(
                    FailureKind::InvalidBody,
                    format!("{collection} record {index}: {err}"),
                )
            })
        })
        .collect()
}
