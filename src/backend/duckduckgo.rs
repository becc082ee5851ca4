use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{StatusCode, Url};
use scraper::{ElementRef, Html, Selector};

use super::SearchBackend;
use crate::data_models::SearchResultItem;
use crate::errors::{BackendFailure, ProviderError};

const HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const BROWSER_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const MAX_RESULTS: usize = 1000;

/// Scrapes the DuckDuckGo HTML frontend.
///
/// There is no real paging here: the whole result batch is fetched for
/// `start == 0` and every later page is reported empty, which ends the query
/// after one page. DuckDuckGo answers 202 instead of results when it starts
/// throttling, and that is treated as quota exhaustion.
pub struct DuckDuckGoBackend {
    client: reqwest::Client,
    endpoint: Url,
    selectors: ResultSelectors,
}

struct ResultSelectors {
    result: Selector,
    link: Selector,
    snippet: Selector,
}

impl ResultSelectors {
    fn new() -> Result<ResultSelectors> {
        let parse = |s: &str| Selector::parse(s).map_err(|e| anyhow::anyhow!("bad selector {s}: {e}"));
        Ok(ResultSelectors {
            result: parse("div.result")?,
            link: parse("a.result__a")?,
            snippet: parse(".result__snippet")?,
        })
    }
}

impl DuckDuckGoBackend {
    pub fn new() -> Result<DuckDuckGoBackend> {
        Self::with_endpoint(HTML_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: &str) -> Result<DuckDuckGoBackend> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .context("Failed to build DuckDuckGo client")?;

        Ok(DuckDuckGoBackend {
            client,
            endpoint: Url::parse(endpoint).context("Invalid DuckDuckGo endpoint")?,
            selectors: ResultSelectors::new()?,
        })
    }

    fn parse_results(&self, html: &str) -> Vec<SearchResultItem> {
        let document = Html::parse_document(html);
        let mut items = Vec::new();

        for result in document.select(&self.selectors.result) {
            if is_ad(&result) {
                continue;
            }
            let Some(link) = result.select(&self.selectors.link).next() else {
                continue;
            };
            let Some(url) = link.value().attr("href").and_then(resolve_href) else {
                continue;
            };

            let title = collapse_text(link);
            let mut item = SearchResultItem::new(url, title);
            if let Some(snippet) = result.select(&self.selectors.snippet).next() {
                item = item.with_body(collapse_text(snippet));
            }
            items.push(item);

            if items.len() >= MAX_RESULTS {
                break;
            }
        }
        items
    }
}

fn is_ad(result: &ElementRef) -> bool {
    result.value().classes().any(|c| c == "result--ad")
}

fn collapse_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Result links are either absolute or DuckDuckGo redirects of the form
/// `//duckduckgo.com/l/?uddg=<encoded target>&rut=...`.
fn resolve_href(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    let url = Url::parse(&absolute).ok()?;

    if url.domain().is_some_and(|d| d.ends_with("duckduckgo.com")) {
        return url
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())
            .filter(|target| target.starts_with("http"));
    }
    matches!(url.scheme(), "http" | "https").then_some(absolute)
}

#[async_trait]
impl SearchBackend for DuckDuckGoBackend {
    async fn fetch_page(
        &self,
        query: &str,
        start: u64,
        _page_size: u64,
    ) -> Result<Vec<SearchResultItem>, ProviderError> {
        if start > 0 {
            log::debug!("duckduckgo returns a single batch, nothing past offset 0");
            return Ok(Vec::new());
        }

        let res = self
            .client
            .post(self.endpoint.clone())
            .form(&[("q", query)])
            .send()
            .await?;
        let status = res.status();
        let body = res.text().await?;

        if status != StatusCode::OK {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(self.parse_results(&body))
    }

    fn classify_error(&self, error: ProviderError) -> BackendFailure {
        match error {
            ProviderError::Status { status: 202, .. } => BackendFailure::QuotaExhausted,
            other => BackendFailure::Transient(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"
        <html><body>
        <div class="result results_links result--ad">
            <a class="result__a" href="https://ads.example/click">Sponsored</a>
        </div>
        <div class="result results_links results_links_deep web-result">
            <h2 class="result__title">
                <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fadmin%2Flogin.php&amp;rut=abc">
                    Admin   <b>Login</b>
                </a>
            </h2>
            <a class="result__snippet" href="//duckduckgo.com/l/?uddg=x">Please   sign in
               to continue</a>
        </div>
        <div class="result results_links web-result">
            <a class="result__a" href="https://direct.example/page">Direct</a>
        </div>
        <div class="result web-result">
            <a class="result__a" href="/relative">Broken</a>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_results_skips_ads_and_decodes_redirects() {
        let backend = DuckDuckGoBackend::new().unwrap();
        let items = backend.parse_results(RESULTS_PAGE);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].url, "https://example.com/admin/login.php");
        assert_eq!(items[0].title, "Admin Login");
        assert_eq!(
            items[0].snippet_body.as_deref(),
            Some("Please sign in to continue")
        );
        assert_eq!(items[1].url, "https://direct.example/page");
        assert!(items[1].snippet_body.is_none());
        assert!(items.iter().all(|i| i.http_status.is_none()));
    }

    #[test]
    fn test_parse_results_empty_page() {
        let backend = DuckDuckGoBackend::new().unwrap();
        let items = backend.parse_results("<html><body><div class=\"no-results\"></div></body></html>");
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_later_pages_are_empty_without_a_request() {
        // unroutable endpoint: any real request would fail
        let backend = DuckDuckGoBackend::with_endpoint("http://127.0.0.1:9/html/").unwrap();
        let items = backend.fetch_page("site:example.com", 10, 10).await.unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_classify_202_is_quota() {
        let backend = DuckDuckGoBackend::new().unwrap();
        let err = ProviderError::Status {
            status: 202,
            body: String::new(),
        };
        assert!(matches!(
            backend.classify_error(err),
            BackendFailure::QuotaExhausted
        ));

        let err = ProviderError::Status {
            status: 503,
            body: String::new(),
        };
        assert!(matches!(
            backend.classify_error(err),
            BackendFailure::Transient(_)
        ));
    }
}
