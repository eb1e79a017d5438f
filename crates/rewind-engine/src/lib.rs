//! Session control and lockstep driver hooks for Rewind.
//!
//! Provides the [`SessionController`] that owns one session's recording
//! and replay state, the [`CommandInbox`] that hands network commands to
//! the tick thread, and the [`LockstepDriver`] that ties both to the
//! embedding game-cycle driver.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod driver;
pub mod error;
pub mod ingress;
pub mod metrics;
pub mod session;

pub use config::{SessionConfig, DEFAULT_FILE_STEM, DEFAULT_INBOX_CAPACITY};
pub use driver::{LockstepDriver, TickOutcome};
pub use error::{ConfigError, IngressError, SessionError};
pub use ingress::{CommandInbox, InboxCommand, InboxSender};
pub use metrics::SessionMetrics;
pub use session::{ExitState, SessionController, SessionMode};
