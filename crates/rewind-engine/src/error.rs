//! Error types for session configuration, control, and command ingress.

use rewind_replay::ReplayError;
use thiserror::Error;

/// Errors detected by [`SessionConfig::validate`](crate::SessionConfig::validate).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The log file stem is empty.
    #[error("log file stem is empty")]
    EmptyFileStem,
    /// The log file stem would escape the log directory.
    #[error("log file stem '{stem}' contains a path separator")]
    FileStemSeparator {
        /// The rejected stem.
        stem: String,
    },
    /// The command inbox cannot hold anything.
    #[error("command inbox capacity must be at least 1")]
    InboxCapacityZero,
}

/// Errors surfaced by [`SessionController`](crate::SessionController) operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Recording, loading, or saving the log failed.
    #[error(transparent)]
    Replay(#[from] ReplayError),
    /// The session configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SessionError {
    /// The underlying replay error, if this is one.
    pub fn as_replay(&self) -> Option<&ReplayError> {
        match self {
            Self::Replay(e) => Some(e),
            Self::Config(_) => None,
        }
    }
}

/// Reasons a command was refused by the [`CommandInbox`](crate::CommandInbox).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum IngressError {
    /// The inbox is at capacity.
    #[error("command inbox full")]
    QueueFull,
    /// The inbox has been dropped.
    #[error("command inbox disconnected")]
    Disconnected,
}
