//! Bounded network-to-tick command hand-off with deterministic ordering.
//!
//! [`CommandInbox`] buffers commands that network tasks receive for the
//! current session until the tick thread records them. Network tasks
//! hold cloneable [`InboxSender`]s; the tick thread calls
//! [`drain()`](CommandInbox::drain) once per tick.
//!
//! # Ordering
//!
//! Drained commands are sorted by the composite key
//! `(seat, source_seq, arrival_seq)`:
//! - Commands from lower seats are recorded first.
//! - Commands from one seat are recorded in the order that seat issued them.
//! - Ties fall back to arrival order.
//!
//! Every peer therefore records the same batch in the same order,
//! whatever order the network delivered it in.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use rewind_core::{CommandRequest, SeatId};

use crate::error::IngressError;

/// A command waiting to be recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboxCommand {
    /// Seat that issued the command.
    pub seat: SeatId,
    /// Per-seat issue sequence number.
    pub source_seq: u64,
    /// Inbox-wide arrival sequence number, assigned on submit.
    pub arrival_seq: u64,
    /// The command itself.
    pub request: CommandRequest,
}

impl InboxCommand {
    fn sort_key(&self) -> (SeatId, u64, u64) {
        (self.seat, self.source_seq, self.arrival_seq)
    }
}

#[derive(Debug, Default)]
struct Counters {
    next_arrival_seq: AtomicU64,
    rejected: AtomicU64,
}

/// Submitting half of a [`CommandInbox`]. Cheap to clone.
#[derive(Clone, Debug)]
pub struct InboxSender {
    tx: Sender<InboxCommand>,
    counters: Arc<Counters>,
}

impl InboxSender {
    /// Queue `request` from `seat` for the next tick.
    ///
    /// # Errors
    ///
    /// [`IngressError::QueueFull`] when the inbox is at capacity and
    /// [`IngressError::Disconnected`] once the inbox has been dropped.
    pub fn submit(
        &self,
        seat: SeatId,
        source_seq: u64,
        request: CommandRequest,
    ) -> Result<(), IngressError> {
        let arrival_seq = self.counters.next_arrival_seq.fetch_add(1, Ordering::Relaxed);
        let cmd = InboxCommand {
            seat,
            source_seq,
            arrival_seq,
            request,
        };
        match self.tx.try_send(cmd) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(cmd)) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(seat = %cmd.seat, source_seq = cmd.source_seq, "command inbox full");
                Err(IngressError::QueueFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(IngressError::Disconnected),
        }
    }
}

/// Bounded command inbox drained by the tick thread.
#[derive(Debug)]
pub struct CommandInbox {
    tx: Sender<InboxCommand>,
    rx: Receiver<InboxCommand>,
    capacity: usize,
    counters: Arc<Counters>,
}

impl CommandInbox {
    /// Create an inbox holding at most `capacity` commands.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "CommandInbox capacity must be at least 1");
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        Self {
            tx,
            rx,
            capacity,
            counters: Arc::default(),
        }
    }

    /// A new submitting handle.
    pub fn sender(&self) -> InboxSender {
        InboxSender {
            tx: self.tx.clone(),
            counters: Arc::clone(&self.counters),
        }
    }

    /// Take every queued command, sorted deterministically.
    pub fn drain(&self) -> Vec<InboxCommand> {
        let mut cmds: Vec<InboxCommand> = self.rx.try_iter().collect();
        cmds.sort_unstable_by_key(InboxCommand::sort_key);
        cmds
    }

    /// Discard every queued command, returning how many were dropped.
    pub fn clear(&self) -> usize {
        self.rx.try_iter().count()
    }

    /// Number of commands currently queued.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Maximum number of queued commands.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total submissions refused with [`IngressError::QueueFull`].
    pub fn rejections(&self) -> u64 {
        self.counters.rejected.load(Ordering::Relaxed)
    }
}
