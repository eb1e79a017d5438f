//! Session configuration and validation.
//!
//! [`SessionConfig`] is the builder input for a
//! [`SessionController`](crate::SessionController).
//! [`validate()`](SessionConfig::validate) checks structural invariants
//! before any file is touched.

use std::path::PathBuf;

use rewind_replay::{DecodeMode, DesyncPolicy};

use crate::error::ConfigError;

/// Default stem for live log files: `<stem>_<seat>.log`.
pub const DEFAULT_FILE_STEM: &str = "log_of_rewind";

/// Default capacity of the network command inbox.
pub const DEFAULT_INBOX_CAPACITY: usize = 1024;

// ── SessionConfig ──────────────────────────────────────────────────

/// Configuration for a recording/replay session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// User data directory. Logs live under [`effective_log_dir`].
    ///
    /// [`effective_log_dir`]: SessionConfig::effective_log_dir
    pub log_dir: PathBuf,
    /// Game name; when set, logs are kept per game.
    pub game_name: Option<String>,
    /// Stem of live log file names. Default: [`DEFAULT_FILE_STEM`].
    pub file_stem: String,
    /// What the replay stepper does on a checksum mismatch. Default: lenient.
    pub desync_policy: DesyncPolicy,
    /// How strictly logs are decoded on load. Default: strict.
    pub decode_mode: DecodeMode,
    /// Bound of the network command inbox. Default: [`DEFAULT_INBOX_CAPACITY`].
    pub inbox_capacity: usize,
    /// Whether live sessions are recorded at all. Default: true.
    pub recording_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("."),
            game_name: None,
            file_stem: DEFAULT_FILE_STEM.to_string(),
            desync_policy: DesyncPolicy::default(),
            decode_mode: DecodeMode::default(),
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
            recording_enabled: true,
        }
    }
}

impl SessionConfig {
    /// A default configuration rooted at `log_dir`.
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            ..Self::default()
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_stem.is_empty() {
            return Err(ConfigError::EmptyFileStem);
        }
        if self.file_stem.contains(['/', '\\']) {
            return Err(ConfigError::FileStemSeparator {
                stem: self.file_stem.clone(),
            });
        }
        if self.inbox_capacity == 0 {
            return Err(ConfigError::InboxCapacityZero);
        }
        Ok(())
    }

    /// Directory that live logs are written to and saved replays are
    /// copied into: `<log_dir>/<game_name>/logs`, or `<log_dir>/logs`.
    pub fn effective_log_dir(&self) -> PathBuf {
        match self.game_name.as_deref().filter(|g| !g.is_empty()) {
            Some(game) => self.log_dir.join(game).join("logs"),
            None => self.log_dir.join("logs"),
        }
    }
}
