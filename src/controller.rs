use std::ops::{Deref, DerefMut};

use tokio_util::sync::CancellationToken;

use crate::data_models::RunState;
use crate::pagination::{PaginationEngine, PaginationState};
use crate::query_loader::{load_queries, resume_from};
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every query ran to the end; the session file is gone.
    Completed,
    /// Stopped on user request; the session file is written.
    Interrupted,
    /// Provider limit hit; the session file is written and can be resumed.
    QuotaExhausted,
    /// A query failed with an unrecoverable error; the session file is written.
    Failed,
}

impl RunOutcome {
    pub fn exit_code(self) -> u8 {
        match self {
            RunOutcome::Completed | RunOutcome::Interrupted => 0,
            RunOutcome::QuotaExhausted | RunOutcome::Failed => 1,
        }
    }
}

/// Owns the live [`RunState`] for the duration of a run and writes it to the
/// session file when dropped, however the run loop was left. Only
/// [`SessionGuard::complete`] skips that final write and removes the file.
struct SessionGuard<'a> {
    store: &'a SessionStore,
    state: RunState,
    armed: bool,
}

impl<'a> SessionGuard<'a> {
    fn new(store: &'a SessionStore, state: RunState) -> SessionGuard<'a> {
        SessionGuard {
            store,
            state,
            armed: true,
        }
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.state) {
            log::error!("failed to save session: {e}");
        }
    }

    fn complete(mut self) {
        self.armed = false;
        if let Err(e) = self.store.clear() {
            log::error!("failed to remove session file: {e}");
        }
    }
}

impl Deref for SessionGuard<'_> {
    type Target = RunState;

    fn deref(&self) -> &RunState {
        &self.state
    }
}

impl DerefMut for SessionGuard<'_> {
    fn deref_mut(&mut self) -> &mut RunState {
        &mut self.state
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.persist();
        }
    }
}

/// Runs every query of the source in order, resuming where a saved session
/// left off.
pub struct RunController {
    engine: PaginationEngine,
    store: SessionStore,
    cancel: CancellationToken,
}

impl RunController {
    pub fn new(
        engine: PaginationEngine,
        store: SessionStore,
        cancel: CancellationToken,
    ) -> RunController {
        RunController {
            engine,
            store,
            cancel,
        }
    }

    /// Drives the whole run. A fresh `state` has no current query and offset
    /// 0; a restored one resumes at its saved query and offset.
    pub async fn run(&mut self, state: RunState) -> RunOutcome {
        let queries = resume_from(
            load_queries(&state.query_source),
            state.current_query.as_deref(),
        );
        let session_path = self.store.path().display().to_string();
        let mut session = SessionGuard::new(&self.store, state);

        for query in &queries {
            if self.cancel.is_cancelled() {
                log::info!("Interrupted by user, saving session to {session_path}");
                return RunOutcome::Interrupted;
            }

            session.enter_query(query);
            log::info!("Query: {query}");

            let result = self
                .engine
                .run(query, &mut session.offset, &self.cancel)
                .await;

            match result {
                Ok(PaginationState::Done | PaginationState::Running) => session.persist(),
                Ok(PaginationState::Interrupted) => {
                    log::info!("Interrupted by user, saving session to {session_path}");
                    return RunOutcome::Interrupted;
                }
                Ok(PaginationState::ExhaustedQuota) => {
                    log::warn!(
                        "Search quota exhausted, saving session to {session_path}. \
                         Run again with --session {session_path} once the quota resets"
                    );
                    return RunOutcome::QuotaExhausted;
                }
                Err(e) => {
                    log::error!("Error during query {query:?}: {e:#}");
                    return RunOutcome::Failed;
                }
            }
        }

        session.complete();
        log::info!("All queries finished");
        RunOutcome::Completed
    }
}
