pub mod backend;
pub mod cli;
pub mod config;
pub mod controller;
pub mod data_models;
pub mod enricher;
pub mod errors;
pub mod formatter;
pub mod output;
pub mod pagination;
pub mod query_loader;
pub mod session;

pub use backend::SearchBackend;
pub use controller::{RunController, RunOutcome};
pub use data_models::{Engine, OutputOptions, PAGE_SIZE, RunState, SearchResultItem};
pub use pagination::{PaginationEngine, PaginationState};
pub use session::SessionStore;
