//! Error types shared by the log, header, and dispatch layers.

use thiserror::Error;

use crate::action::ActionTag;
use crate::id::{SeatId, SlotId, TickId};

/// Errors raised while building or validating core values.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CoreError {
    /// An action name is not in the closed [`ActionTag`] vocabulary.
    #[error("unknown action '{name}'")]
    UnknownAction {
        /// The unrecognized wire name.
        name: String,
    },
    /// A record was appended with a tick lower than the last record's.
    #[error("record for tick {tick} appended after tick {last}")]
    BackdatedRecord {
        /// Tick of the rejected record.
        tick: TickId,
        /// Tick of the last record already in the log.
        last: TickId,
    },
    /// A seat index is outside `0..MAX_SEATS`.
    #[error("seat {seat} is out of range")]
    SeatOutOfRange {
        /// The offending seat.
        seat: SeatId,
    },
}

/// Reasons a logged record cannot be turned into a dispatchable command.
///
/// All variants are non-fatal for replay stepping: the record is
/// reported and skipped.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The record's action name is not in the vocabulary.
    #[error("unknown action '{name}'")]
    UnknownAction {
        /// The unrecognized wire name.
        name: String,
    },
    /// A field the action needs was unset in the record.
    #[error("'{action}' record is missing its {argument}")]
    MissingArgument {
        /// The action being dispatched.
        action: ActionTag,
        /// Which argument was missing.
        argument: &'static str,
    },
    /// The actor slot holds no live entity.
    #[error("actor slot {slot} is empty")]
    UnknownActor {
        /// The unresolved slot.
        slot: SlotId,
    },
    /// The live entity in the actor slot has a different type than at
    /// record time.
    #[error("actor slot {slot} holds '{live}', record expects '{recorded}'")]
    ActorMismatch {
        /// The actor slot.
        slot: SlotId,
        /// Type identifier stored in the record.
        recorded: String,
        /// Type identifier of the live entity.
        live: String,
    },
}
