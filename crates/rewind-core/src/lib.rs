//! Core types and traits for the Rewind command log and replay system.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the recorder, the replay stepper, and the
//! session controller: identifiers, the closed action vocabulary, the
//! typed dispatch commands, logged command records, the replay header,
//! the deterministic sync random stream, and the [`Simulation`] trait
//! through which the externally owned engine is driven.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod command;
pub mod error;
pub mod header;
pub mod id;
pub mod record;
pub mod rng;
pub mod traits;

pub use action::ActionTag;
pub use command::{CommandRequest, InputKind, SimCommand};
pub use error::{CoreError, DispatchError};
pub use header::{
    ReplayHeader, RuleSettings, SeatDescriptor, Seats, SessionKind, SessionSetup, VersionTriple,
};
pub use id::{SeatId, SlotId, TickId, TilePos, MAX_SEATS};
pub use record::{CommandLog, CommandRecord, RecordedAction};
pub use rng::SyncRand;
pub use traits::{SessionNotice, Simulation};
