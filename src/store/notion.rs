//! HTTP client for the page database API

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{ListingQuery, RecordStore, StoreError, StoreResult};
use crate::models::{ExternalRecord, PropertyMap};

/// Largest page the query endpoint returns.
const PAGE_SIZE: u32 = 100;

#[derive(Clone)]
pub struct NotionStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct QueryPage {
    results: Vec<ExternalRecord>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl NotionStore {
    pub fn new(
        base_url: &str,
        token: &str,
        api_version: &str,
        timeout: Duration,
    ) -> StoreResult<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| StoreError::Transport(format!("invalid store token: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        let version = HeaderValue::from_str(api_version)
            .map_err(|e| StoreError::Transport(format!("invalid API version: {}", e)))?;
        headers.insert("notion-version", version);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> StoreResult<T> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();

        if status.is_success() {
            return response.json::<T>().await.map_err(|e| {
                if e.is_timeout() {
                    StoreError::Timeout(e.to_string())
                } else {
                    StoreError::Decode(e.to_string())
                }
            });
        }

        let text = response.text().await.unwrap_or_default();
        let error = error_from_response(status.as_u16(), &text);
        warn!("Store request failed with {}: {}", status, error);
        Err(error)
    }
}

fn transport_error(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout(err.to_string())
    } else {
        StoreError::Transport(err.to_string())
    }
}

/// Classifies a non-success response by its error code, then by status.
fn error_from_response(status: u16, body: &str) -> StoreError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let code = parsed.as_ref().and_then(|b| b.code.clone()).unwrap_or_default();
    let message = parsed
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());

    match (code.as_str(), status) {
        ("rate_limited", _) | (_, 429) => StoreError::RateLimited(message),
        ("validation_error", _) | (_, 400) => StoreError::Validation(message),
        ("object_not_found", _) | (_, 404) => StoreError::NotFound(message),
        ("gateway_timeout", _) | (_, 504) => StoreError::Timeout(message),
        ("service_unavailable", _) | (_, 502) | (_, 503) => StoreError::Transport(message),
        _ => StoreError::Upstream { status, message },
    }
}

/// Fetches pages until the store reports no more, passing each page's
/// cursor to the next fetch. A page claiming more without a cursor ends
/// the listing.
async fn collect_pages<F, Fut>(mut fetch: F) -> StoreResult<Vec<ExternalRecord>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = StoreResult<QueryPage>>,
{
    let mut records = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = fetch(cursor.take()).await?;
        records.extend(page.results);

        match (page.has_more, page.next_cursor) {
            (true, Some(next)) => cursor = Some(next),
            _ => break,
        }
    }

    Ok(records)
}

fn query_body(query: &ListingQuery, cursor: Option<&str>) -> Value {
    let mut body = json!({
        "sorts": [{ "property": query.sort_property, "direction": "ascending" }],
        "page_size": PAGE_SIZE,
    });
    if let Some(filter) = &query.filter {
        body["filter"] = json!({
            "property": filter.checkbox_property,
            "checkbox": { "equals": true },
        });
    }
    if let Some(cursor) = cursor {
        body["start_cursor"] = json!(cursor);
    }
    body
}

#[async_trait]
impl RecordStore for NotionStore {
    async fn query_all(&self, query: &ListingQuery) -> StoreResult<Vec<ExternalRecord>> {
        let url = self.url(&format!("/databases/{}/query", query.database_id));
        let records = collect_pages(|cursor| {
            let body = query_body(query, cursor.as_deref());
            self.send::<QueryPage>(self.client.post(&url).json(&body))
        })
        .await?;

        debug!(
            "Queried {} records from database {}",
            records.len(),
            query.database_id
        );
        Ok(records)
    }

    async fn create(
        &self,
        database_id: &str,
        properties: PropertyMap,
    ) -> StoreResult<ExternalRecord> {
        let body = json!({
            "parent": { "type": "database_id", "database_id": database_id },
            "properties": properties,
        });
        self.send(self.client.post(self.url("/pages")).json(&body))
            .await
    }

    async fn update_by_id(
        &self,
        handle: &str,
        properties: PropertyMap,
    ) -> StoreResult<ExternalRecord> {
        let body = json!({ "properties": properties });
        self.send(
            self.client
                .patch(self.url(&format!("/pages/{}", handle)))
                .json(&body),
        )
        .await
    }

    async fn archive_by_id(&self, handle: &str) -> StoreResult<()> {
        let body = json!({ "archived": true });
        let _: Value = self
            .send(
                self.client
                    .patch(self.url(&format!("/pages/{}", handle)))
                    .json(&body),
            )
            .await?;
        Ok(())
    }
}
