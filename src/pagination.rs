use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::backend::SearchBackend;
use crate::data_models::PAGE_SIZE;
use crate::enricher::PageEnricher;
use crate::errors::BackendFailure;
use crate::output::ResultSink;

/// Pause between two pages of the same query.
pub const PAGE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    Running,
    /// A page came back empty, or the backend signalled the end of results.
    Done,
    /// Provider limit hit. The offset still points at the page that failed.
    ExhaustedQuota,
    /// Cancelled between two pages.
    Interrupted,
}

/// Walks one query page by page until it runs dry or the provider refuses
/// to serve more.
pub struct PaginationEngine {
    backend: Box<dyn SearchBackend>,
    enricher: PageEnricher,
    sink: ResultSink,
    page_size: u64,
}

impl PaginationEngine {
    pub fn new(
        backend: Box<dyn SearchBackend>,
        enricher: PageEnricher,
        sink: ResultSink,
    ) -> PaginationEngine {
        PaginationEngine {
            backend,
            enricher,
            sink,
            page_size: PAGE_SIZE,
        }
    }

    pub fn sink(&self) -> &ResultSink {
        &self.sink
    }

    /// Runs `query` starting at `*offset`.
    ///
    /// `offset` is advanced after every non-empty page, so on return it is the
    /// start of the next page to fetch. On quota exhaustion it is left on the
    /// failing page so a resumed run retries exactly that page.
    ///
    /// Transient backend errors end the query; only errors the backend
    /// classifies as fatal, and failures writing results, are returned.
    pub async fn run(
        &mut self,
        query: &str,
        offset: &mut u64,
        cancel: &CancellationToken,
    ) -> Result<PaginationState> {
        let mut state = PaginationState::Running;

        while state == PaginationState::Running {
            if cancel.is_cancelled() {
                state = PaginationState::Interrupted;
                break;
            }
            state = self.step(query, offset).await?;

            if state == PaginationState::Running {
                tokio::select! {
                    _ = cancel.cancelled() => {}
                    _ = tokio::time::sleep(PAGE_DELAY) => {}
                }
            }
        }
        Ok(state)
    }

    async fn step(&mut self, query: &str, offset: &mut u64) -> Result<PaginationState> {
        let page = *offset / self.page_size + 1;
        log::info!("Page {page}");

        let items = match self.backend.fetch_page(query, *offset, self.page_size).await {
            Ok(items) => items,
            Err(err) => {
                return match self.backend.classify_error(err) {
                    BackendFailure::EndOfResults => {
                        log::info!("No more links for current query");
                        Ok(PaginationState::Done)
                    }
                    BackendFailure::QuotaExhausted => {
                        log::warn!("Resource limit reached on page {page}");
                        Ok(PaginationState::ExhaustedQuota)
                    }
                    BackendFailure::Transient(e) => {
                        log::error!("{e}");
                        Ok(PaginationState::Done)
                    }
                    fatal @ BackendFailure::Fatal(_) => {
                        Err(fatal).with_context(|| format!("page {page} of {query:?} failed"))
                    }
                };
            }
        };

        if items.is_empty() {
            log::info!("No more links for current query");
            return Ok(PaginationState::Done);
        }

        let options = self.sink.formatter().options().clone();
        let items = self.enricher.enrich(items, &options).await;
        for item in &items {
            self.sink.emit(item)?;
        }

        *offset += self.page_size;
        Ok(PaginationState::Running)
    }
}
