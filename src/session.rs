use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::data_models::{PAGE_SIZE, RunState};
use crate::errors::SessionError;

/// Reads and writes the resumable run state as pretty-printed JSON:
///
/// ```json
/// {
///   "file_or_query": "dorks.txt",
///   "options": { "title": true, "code": false, "body": false, "dest": null, "debug": false, "engine": "google" },
///   "current_query": "inurl:admin",
///   "offset": 30
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> SessionStore {
        SessionStore { path: path.into() }
    }

    /// `gdorker_session_<unix-timestamp>.json` in the working directory.
    pub fn with_generated_name() -> SessionStore {
        let timestamp = chrono::Utc::now().timestamp();
        SessionStore::new(format!("gdorker_session_{timestamp}.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the session file. The JSON goes to a sibling temp file
    /// first and is renamed into place.
    pub fn save(&self, state: &RunState) -> Result<(), SessionError> {
        let json = serde_json::to_string_pretty(state).map_err(|e| SessionError::CorruptSession {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(|source| self.io_error(source))?;
        fs::rename(&tmp, &self.path).map_err(|source| self.io_error(source))?;

        log::debug!(
            "session saved to {} (query {:?}, offset {})",
            self.path.display(),
            state.current_query,
            state.offset
        );
        Ok(())
    }

    pub fn load(&self) -> Result<RunState, SessionError> {
        let content = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        let state: RunState =
            serde_json::from_str(&content).map_err(|e| self.corrupt(e.to_string()))?;

        if state.offset % PAGE_SIZE != 0 {
            return Err(self.corrupt(format!(
                "offset {} is not a multiple of the page size {}",
                state.offset, PAGE_SIZE
            )));
        }
        Ok(state)
    }

    /// Removes the session file. A file that is already gone is not an error.
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn corrupt(&self, reason: String) -> SessionError {
        SessionError::CorruptSession {
            path: self.path.clone(),
            reason,
        }
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
