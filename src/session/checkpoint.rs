use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Checkpoint file name inside a user's backup directory
pub const SESSION_FILE: &str = ".session.json";

/// Timestamp format of `saved_at`
const SAVED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors raised while persisting a checkpoint
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persisted progress of an interrupted backup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    /// Target the checkpoint belongs to
    pub csv_path: Option<String>,

    /// Number of work items completed
    pub current_index: usize,

    /// Per-item counters
    pub stats: BTreeMap<String, u64>,

    /// Completed work items, in completion order
    pub processed_titles: Vec<String>,

    /// Items that were passed over, kept as written
    pub skipped_items: Vec<Value>,

    /// Local time of the last save
    pub saved_at: Option<String>,
}

/// A checkpoint bound to its file on disk
#[derive(Debug, Clone)]
pub struct Session {
    file: PathBuf,
    pub state: SessionState,
}

impl Session {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            state: SessionState::default(),
        }
    }

    /// Checkpoint stored as [`SESSION_FILE`] in `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SESSION_FILE))
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Loads the checkpoint from disk
    ///
    /// Returns `false` when there is no file, or when it cannot be read or
    /// decoded (reported with a warning). The in-memory state is only
    /// replaced on success.
    pub fn load(&mut self) -> bool {
        if !self.file.is_file() {
            return false;
        }

        let decoded = std::fs::read_to_string(&self.file)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<SessionState>(&content).map_err(|e| e.to_string())
            });

        match decoded {
            Ok(state) => {
                self.state = state;
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Could not load session from {}: {}",
                    self.file.display(),
                    e
                );
                false
            }
        }
    }

    /// Writes the checkpoint, stamping `saved_at`
    pub fn save(&mut self) -> Result<(), SessionError> {
        self.state.saved_at = Some(Local::now().format(SAVED_AT_FORMAT).to_string());
        let content = serde_json::to_string_pretty(&self.state)?;

        if let Some(parent) = self.file.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        std::fs::write(&self.file, content).map_err(|source| self.io_error(source))
    }

    /// Deletes the checkpoint file and resets the in-memory state
    pub fn clear(&mut self) -> Result<(), SessionError> {
        if self.file.exists() {
            std::fs::remove_file(&self.file).map_err(|source| self.io_error(source))?;
        }
        self.state = SessionState::default();
        Ok(())
    }

    /// Starts a new checkpoint for `csv_path`, dropping previous progress
    pub fn begin(&mut self, csv_path: &str) {
        self.state = SessionState {
            csv_path: Some(csv_path.to_string()),
            ..Default::default()
        };
    }

    /// True when this checkpoint belongs to `csv_path` and has progress
    pub fn is_resumable(&self, csv_path: &str) -> bool {
        self.state.csv_path.as_deref() == Some(csv_path) && self.state.current_index > 0
    }

    /// Records a completed item and the new position
    pub fn mark_processed(&mut self, title: &str, index: usize) {
        self.state.processed_titles.push(title.to_string());
        self.state.current_index = index;
    }

    pub fn is_processed(&self, title: &str) -> bool {
        self.state.processed_titles.iter().any(|t| t == title)
    }

    /// Human-readable summary of the checkpoint
    pub fn resume_info(&self) -> String {
        let Some(csv_path) = &self.state.csv_path else {
            return "No active session".to_string();
        };

        format!(
            "Session for: {}\n  Progress: {} items processed\n  Saved at: {}\n  Skipped: {}",
            csv_path,
            self.state.current_index,
            self.state.saved_at.as_deref().unwrap_or("never"),
            self.state.skipped_items.len()
        )
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.file.clone(),
            source,
        }
    }
}
