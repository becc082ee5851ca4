use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use gdorker::backend::create_backend;
use gdorker::cli::Cli;
use gdorker::config::ConfigManager;
use gdorker::enricher::PageEnricher;
use gdorker::errors::SessionError;
use gdorker::formatter::ResultFormatter;
use gdorker::output::ResultSink;
use gdorker::{Engine, PaginationEngine, RunController, RunOutcome, RunState, SessionStore};

const BANNER: &str = r"
   __ _       __| | ___  _ __| | _____ _ __
  / _` |____ / _` |/ _ \| '__| |/ / _ \ '__|
 | (_| |____| (_| | (_) | |  |   <  __/ |
  \__, |     \__,_|\___/|_|  |_|\_\___|_|
  |___/
";

type Restored = (SessionStore, Result<RunState, SessionError>);

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let restored: Option<Restored> = cli.session.as_ref().map(|path| {
        let store = SessionStore::new(path);
        let loaded = store.load();
        (store, loaded)
    });
    let debug = cli.debug
        || matches!(&restored, Some((_, Ok(state))) if state.output_options.debug);

    // Diagnostics go to stderr so stdout carries only result lines.
    // The fmt subscriber also bridges the log crate's macros.
    tracing_subscriber::fmt()
        .with_max_level(if debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(debug)
        .with_writer(std::io::stderr)
        .init();

    if !cli.no_banner {
        eprintln!("{BANNER}");
    }

    match run(cli, restored).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, restored: Option<Restored>) -> Result<RunOutcome> {
    let (store, state) = match restored {
        Some((store, loaded)) => {
            let state = loaded.context("Cannot resume session")?;
            log::info!(
                "Resuming {} at query {:?}, offset {}",
                store.path().display(),
                state.current_query,
                state.offset
            );
            (store, state)
        }
        None => {
            let query = cli
                .query
                .clone()
                .context("a query or a session file is required")?;
            let store = SessionStore::with_generated_name();
            (store, RunState::new(query, cli.output_options()))
        }
    };

    let engine = state.output_options.engine;
    log::info!("Using {engine} as search engine");

    let config = ConfigManager::open(cli.config.clone());
    let credentials = match (engine, config) {
        (Engine::Google, config) => {
            let credentials = config?.google_credentials(cli.api_key.as_deref(), cli.cse_id.as_deref())?;
            Some(credentials)
        }
        (Engine::DuckDuckGo, Err(e)) => {
            log::warn!("{e}");
            None
        }
        (Engine::DuckDuckGo, Ok(_)) => None,
    };

    let backend = create_backend(engine, credentials)?;
    let sink = ResultSink::new(ResultFormatter::new(state.output_options.clone()))?;
    let pagination = PaginationEngine::new(backend, PageEnricher::new()?, sink);

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let mut controller = RunController::new(pagination, store, cancel);
    Ok(controller.run(state).await)
}

/// Exit status for a run killed by a second Ctrl-C (128 + SIGINT).
const FORCED_EXIT_CODE: i32 = 130;

fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if watch_interrupts(tokio::signal::ctrl_c, cancel).await {
            log::warn!("Second interrupt received, exiting without waiting for in-flight requests");
            std::process::exit(FORCED_EXIT_CODE);
        }
    });
}

/// The first interrupt cancels `cancel` so the run can save its session and
/// stop cleanly. Returns true if a second interrupt follows.
async fn watch_interrupts<S, F>(mut next_interrupt: S, cancel: CancellationToken) -> bool
where
    S: FnMut() -> F,
    F: Future<Output = std::io::Result<()>>,
{
    if next_interrupt().await.is_err() {
        return false;
    }
    log::info!("Interrupt received, stopping after the current step. Press Ctrl-C again to quit now");
    cancel.cancel();

    next_interrupt().await.is_ok()
}
