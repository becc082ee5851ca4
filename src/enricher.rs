use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::join_all;

use crate::data_models::{OutputOptions, SearchResultItem};

pub const MAX_BODY_BYTES: usize = 256 * 1024;

/// Fills in status code and page body by fetching each result URL.
///
/// All fetches of a page run concurrently and `enrich` only returns once every
/// one of them has finished, so a page is always printed as a whole.
pub struct PageEnricher {
    client: reqwest::Client,
}

impl PageEnricher {
    pub fn new() -> Result<PageEnricher> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(PageEnricher { client })
    }

    /// True when `options` asks for a field the backend did not provide.
    pub fn needs_fetch(item: &SearchResultItem, options: &OutputOptions) -> bool {
        (options.show_http_code && item.http_status.is_none())
            || (options.show_body_snippet && item.snippet_body.is_none())
    }

    pub async fn enrich(
        &self,
        items: Vec<SearchResultItem>,
        options: &OutputOptions,
    ) -> Vec<SearchResultItem> {
        if !items.iter().any(|item| Self::needs_fetch(item, options)) {
            return items;
        }

        let tasks = items.into_iter().map(|item| async move {
            if Self::needs_fetch(&item, options) {
                self.fetch_into(item).await
            } else {
                item
            }
        });
        join_all(tasks).await
    }

    async fn fetch_into(&self, mut item: SearchResultItem) -> SearchResultItem {
        match self.fetch(&item.url).await {
            Ok((status, body)) => {
                log::debug!("fetched {} ({status}, {} bytes)", item.url, body.len());
                item.http_status.get_or_insert(status);
                item.snippet_body.get_or_insert(body);
            }
            // left empty on purpose: the formatter prints these as unavailable
            Err(e) => log::warn!("could not fetch {}: {:#}", item.url, e),
        }
        item
    }

    /// Reads at most [`MAX_BODY_BYTES`] of the body. Only the start of the
    /// page ends up in the snippet, and dorks often hit large binaries.
    async fn fetch(&self, url: &str) -> Result<(u16, String)> {
        let mut res = self.client.get(url).send().await?;
        let status = res.status().as_u16();

        let mut body = Vec::new();
        while let Some(chunk) = res.chunk().await? {
            let room = MAX_BODY_BYTES - body.len();
            body.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if body.len() == MAX_BODY_BYTES {
                log::debug!("{url}: body truncated at {MAX_BODY_BYTES} bytes");
                break;
            }
        }
        Ok((status, String::from_utf8_lossy(&body).into_owned()))
    }
}
