use std::path::PathBuf;

use thiserror::Error;

/// Raw failure of a single backend request, before classification.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// What a backend failure means for the pagination loop.
#[derive(Debug, Error)]
pub enum BackendFailure {
    /// Graceful end of the result window. Stop this query, nothing to report.
    #[error("no more results")]
    EndOfResults,

    /// Provider-imposed limit. The run stops and can be resumed later.
    #[error("search quota exhausted")]
    QuotaExhausted,

    /// Logged and treated as the end of the current query.
    #[error("transient backend error: {0}")]
    Transient(#[source] ProviderError),

    /// Propagated out of the query as an unrecoverable error.
    #[error("backend error: {0}")]
    Fatal(#[source] ProviderError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt session file {path}: {reason}")]
    CorruptSession { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "Google API key and CSE ID must be set via --api-key/--cx, GOOGLE_API_KEY/GOOGLE_CSE_ID or {path}"
    )]
    MissingCredentials { path: PathBuf },

    #[error("could not determine the home directory for the default config path")]
    NoHomeDir,
}
