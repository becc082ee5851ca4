use anyhow::Result;
use async_trait::async_trait;

use crate::config::GoogleCredentials;
use crate::data_models::{Engine, SearchResultItem};
use crate::errors::{BackendFailure, ProviderError};

pub mod duckduckgo;
pub mod google;

pub use duckduckgo::DuckDuckGoBackend;
pub use google::GoogleBackend;

/// A search provider seen as "give me one page of results".
///
/// `fetch_page` reports raw provider failures; `classify_error` decides what
/// such a failure means for the pagination loop. The engine only ever talks
/// to this trait and never looks at which provider sits behind it.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn fetch_page(
        &self,
        query: &str,
        start: u64,
        page_size: u64,
    ) -> Result<Vec<SearchResultItem>, ProviderError>;

    fn classify_error(&self, error: ProviderError) -> BackendFailure;
}

/// Builds the backend selected on the command line.
pub fn create_backend(
    engine: Engine,
    credentials: Option<GoogleCredentials>,
) -> Result<Box<dyn SearchBackend>> {
    match engine {
        Engine::Google => {
            let credentials = credentials
                .ok_or_else(|| anyhow::anyhow!("google engine selected without credentials"))?;
            Ok(Box::new(GoogleBackend::new(credentials)?))
        }
        Engine::DuckDuckGo => Ok(Box::new(DuckDuckGoBackend::new()?)),
    }
}
