//! Error types for the replay system.

use std::io;
use std::path::PathBuf;

use rewind_core::{CoreError, TickId};
use thiserror::Error;

use crate::desync::DesyncReport;

/// Errors that can occur while recording, decoding, or replaying a log.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// An I/O error occurred during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The log text could not be decoded.
    #[error("malformed log at line {line}: {detail}")]
    MalformedLog {
        /// 1-based line of the offending token or statement.
        line: usize,
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A record names an action outside the vocabulary.
    #[error("unknown action '{name}' at tick {tick}")]
    UnknownAction {
        /// Tick of the record.
        tick: TickId,
        /// The unrecognized wire name.
        name: String,
    },
    /// The live checksum diverged from the recorded one.
    #[error("{0}")]
    Desync(DesyncReport),
    /// The log directory or file could not be created or opened.
    #[error("log file {} is unavailable: {source}", .path.display())]
    LogFileUnavailable {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A save destination contains a path separator or is empty.
    #[error("invalid replay destination '{name}'")]
    InvalidDestination {
        /// The rejected name.
        name: String,
    },
    /// No log file backs the current session.
    #[error("no log file is backing the current session")]
    NoBackingLog,
    /// A core invariant was violated.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ReplayError {
    pub(crate) fn malformed(line: usize, detail: impl Into<String>) -> Self {
        Self::MalformedLog {
            line,
            detail: detail.into(),
        }
    }
}
