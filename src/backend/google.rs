use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use super::SearchBackend;
use crate::config::GoogleCredentials;
use crate::data_models::SearchResultItem;
use crate::errors::{BackendFailure, ProviderError};

const CUSTOM_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<ResponseItem>,
}

#[derive(Debug, Deserialize)]
struct ResponseItem {
    link: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
}

/// Google Custom Search JSON API. Every call spends one unit of the daily quota.
pub struct GoogleBackend {
    client: reqwest::Client,
    endpoint: Url,
    credentials: GoogleCredentials,
}

impl GoogleBackend {
    pub fn new(credentials: GoogleCredentials) -> Result<GoogleBackend> {
        Self::with_endpoint(credentials, CUSTOM_SEARCH_ENDPOINT)
    }

    pub fn with_endpoint(credentials: GoogleCredentials, endpoint: &str) -> Result<GoogleBackend> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build Custom Search client")?;
        let endpoint = Url::parse(endpoint).context("Invalid Custom Search endpoint")?;

        Ok(GoogleBackend {
            client,
            endpoint,
            credentials,
        })
    }

    fn request_url(&self, query: &str, start: u64, page_size: u64) -> Url {
        let mut url = self.endpoint.clone();
        // the API counts results from 1
        url.query_pairs_mut()
            .append_pair("key", &self.credentials.api_key)
            .append_pair("cx", &self.credentials.cse_id)
            .append_pair("q", query)
            .append_pair("start", &(start + 1).to_string())
            .append_pair("num", &page_size.to_string());
        url
    }
}

pub(crate) fn parse_items(body: &str) -> Result<Vec<SearchResultItem>, ProviderError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    Ok(response
        .items
        .into_iter()
        .map(|item| SearchResultItem::new(item.link, item.title))
        .collect())
}

/// Maps a Custom Search error onto the pagination outcome.
///
/// `RESOURCE_EXHAUSTED` means the daily quota is gone. `INVALID_ARGUMENT` is
/// what the API answers when paging past its result window, so it ends the
/// query quietly.
pub(crate) fn classify(error: ProviderError) -> BackendFailure {
    let (status, body) = match error {
        ProviderError::Status { status, body } => (status, body),
        other => return BackendFailure::Transient(other),
    };

    let envelope = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => envelope,
        Err(_) if status == StatusCode::TOO_MANY_REQUESTS.as_u16() => {
            return BackendFailure::QuotaExhausted;
        }
        Err(_) => return BackendFailure::Transient(ProviderError::Status { status, body }),
    };

    log::debug!(
        "custom search error {}: {}",
        envelope.error.status,
        envelope.error.message
    );

    match envelope.error.status.as_str() {
        "RESOURCE_EXHAUSTED" => BackendFailure::QuotaExhausted,
        "INVALID_ARGUMENT" => BackendFailure::EndOfResults,
        "" if status == StatusCode::TOO_MANY_REQUESTS.as_u16() => BackendFailure::QuotaExhausted,
        _ => BackendFailure::Fatal(ProviderError::Status { status, body }),
    }
}

#[async_trait]
impl SearchBackend for GoogleBackend {
    async fn fetch_page(
        &self,
        query: &str,
        start: u64,
        page_size: u64,
    ) -> Result<Vec<SearchResultItem>, ProviderError> {
        let res = self
            .client
            .get(self.request_url(query, start, page_size))
            .send()
            .await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_items(&body)
    }

    fn classify_error(&self, error: ProviderError) -> BackendFailure {
        classify(error)
    }
}
