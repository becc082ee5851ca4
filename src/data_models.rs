use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

/// Number of results requested per page. Offsets always move in steps of this size.
pub const PAGE_SIZE: u64 = 10;

/// One search hit. `snippet_body` and `http_status` are filled either by the
/// backend itself or by the live fetch done in the enricher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultItem {
    pub url: String,
    pub title: String,
    pub snippet_body: Option<String>,
    pub http_status: Option<u16>,
}

impl SearchResultItem {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> SearchResultItem {
        SearchResultItem {
            url: url.into(),
            title: title.into(),
            snippet_body: None,
            http_status: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> SearchResultItem {
        self.snippet_body = Some(body.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> SearchResultItem {
        self.http_status = Some(status);
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Google,
    #[value(name = "duckduckgo")]
    DuckDuckGo,
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Google => write!(f, "google"),
            Engine::DuckDuckGo => write!(f, "duckduckgo"),
        }
    }
}

/// Output settings for a whole run. Built once at startup and stored in the
/// session so a resumed run prints exactly the same way.
///
/// Field names on disk follow the short flag names (`title`, `code`, `body`,
/// `dest`) used by existing session files.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputOptions {
    #[serde(rename = "title")]
    pub show_title: bool,
    #[serde(rename = "code")]
    pub show_http_code: bool,
    #[serde(rename = "body")]
    pub show_body_snippet: bool,
    #[serde(rename = "dest", deserialize_with = "nullable")]
    pub destination_file: Option<String>,
    pub debug: bool,
    #[serde(default)]
    pub engine: Engine,
}

/// `null` is accepted but the key itself must be present. A plain `Option`
/// field would quietly become `None` when missing from a truncated file.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// The resumable unit written to the session file.
///
/// `offset` is the start index of the next page to fetch for `current_query`
/// and is always a multiple of [`PAGE_SIZE`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    #[serde(rename = "file_or_query")]
    pub query_source: String,
    #[serde(rename = "options")]
    pub output_options: OutputOptions,
    #[serde(deserialize_with = "nullable")]
    pub current_query: Option<String>,
    pub offset: u64,
}

impl RunState {
    pub fn new(query_source: String, output_options: OutputOptions) -> RunState {
        RunState {
            query_source,
            output_options,
            current_query: None,
            offset: 0,
        }
    }

    /// Points the state at `query`. Switching to a different query restarts
    /// at offset 0; re-entering the saved query keeps the resumed offset.
    pub fn enter_query(&mut self, query: &str) {
        if self.current_query.as_deref() != Some(query) {
            self.current_query = Some(query.to_string());
            self.offset = 0;
        }
    }
}
