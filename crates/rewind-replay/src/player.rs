//! Replay stepper.
//!
//! A [`Player`] owns a decoded [`CommandLog`] and a cursor into it. Each
//! simulation tick the session calls [`Player::advance`]; when the tick
//! equals the tick of the next pending record, every record stamped
//! with that tick is verified and dispatched to the simulation in log
//! order.
//!
//! # State machine
//!
//! ```text
//! Idle --load--> Primed --advance(due)--> Stepping --last record--> Exhausted
//!                  |                         |
//!                  +------ desync (Strict) --+--> Desynced
//! ```
//!
//! An empty log loads straight into `Exhausted`; the end-of-replay
//! notice is still raised on the first `advance`.

use smallvec::SmallVec;

use rewind_core::{
    ActionTag, CommandLog, DispatchError, ReplayHeader, SessionNotice, SimCommand, Simulation,
    TickId,
};

use crate::desync::{check, DesyncReport};

/// Lifecycle of a [`Player`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlayerState {
    /// Nothing loaded.
    #[default]
    Idle,
    /// Loaded, no record dispatched yet.
    Primed,
    /// At least one tick dispatched, records remain.
    Stepping,
    /// Every record has been consumed.
    Exhausted,
    /// Halted on a checksum mismatch under [`DesyncPolicy::Strict`].
    Desynced,
}

/// What happens when the live checksum disagrees with a record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DesyncPolicy {
    /// Notify once, keep dispatching, flag the replay out of sync.
    #[default]
    Lenient,
    /// Notify once and stop dispatching.
    Strict,
}

/// A record that was reported and not dispatched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Position of the record in the log.
    pub index: usize,
    /// Tick of the record.
    pub tick: TickId,
    /// Why it could not be dispatched.
    pub reason: DispatchError,
}

/// Result of one [`Player::advance`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Actions submitted to the simulation, in order.
    pub dispatched: SmallVec<[ActionTag; 8]>,
    /// Records skipped during this call.
    pub skipped: SmallVec<[SkippedRecord; 2]>,
    /// The first desync of the replay, if it was detected in this call.
    pub desync: Option<DesyncReport>,
    /// Whether the end-of-replay notice was raised in this call.
    pub finished: bool,
}

impl StepReport {
    /// Whether the call dispatched or reported anything at all.
    pub fn is_empty(&self) -> bool {
        self.dispatched.is_empty()
            && self.skipped.is_empty()
            && self.desync.is_none()
            && !self.finished
    }
}

/// Feeds logged commands back to the simulation on their recorded ticks.
#[derive(Debug, Default)]
pub struct Player {
    log: CommandLog,
    cursor: usize,
    state: PlayerState,
    policy: DesyncPolicy,
    first_desync: Option<DesyncReport>,
    end_announced: bool,
}

impl Player {
    /// An idle player using `policy` for checksum mismatches.
    pub fn new(policy: DesyncPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Load a decoded log and prepare to step it.
    ///
    /// Applies the recorded seat names to the live seats (unnamed seats
    /// keep their live names) and resets the cursor.
    pub fn load<S: Simulation + ?Sized>(
        &mut self,
        header: &ReplayHeader,
        log: CommandLog,
        sim: &mut S,
    ) {
        for (seat, desc) in header.seats.iter() {
            if !desc.name.is_empty() {
                sim.set_seat_name(seat, &desc.name);
            }
        }
        self.state = if log.is_empty() {
            PlayerState::Exhausted
        } else {
            PlayerState::Primed
        };
        self.log = log;
        self.cursor = 0;
        self.first_desync = None;
        self.end_announced = false;
        tracing::info!(
            records = self.log.len(),
            first_tick = ?self.next_due(),
            "replay loaded"
        );
    }

    /// Dispatch every record due at `current_tick`.
    ///
    /// Does nothing unless `current_tick` equals [`next_due`]; calling
    /// again for a tick that was already processed dispatches nothing.
    ///
    /// [`next_due`]: Player::next_due
    pub fn advance<S: Simulation + ?Sized>(
        &mut self,
        current_tick: TickId,
        sim: &mut S,
    ) -> StepReport {
        let mut report = StepReport::default();
        match self.state {
            PlayerState::Idle | PlayerState::Desynced => return report,
            PlayerState::Exhausted => {
                self.announce_end(sim, &mut report);
                return report;
            }
            PlayerState::Primed | PlayerState::Stepping => {}
        }
        if self.next_due() != Some(current_tick) {
            return report;
        }
        self.state = PlayerState::Stepping;

        while let Some(rec) = self.log.get(self.cursor) {
            if rec.tick != current_tick {
                break;
            }
            let index = self.cursor;

            if let Some(desync) = check(rec.tick, sim.sync_checksum(), rec.checksum) {
                if self.first_desync.is_none() {
                    tracing::warn!(
                        tick = %desync.tick,
                        live = desync.live,
                        recorded = desync.recorded,
                        policy = ?self.policy,
                        "replay out of sync"
                    );
                    self.first_desync = Some(desync);
                    report.desync = Some(desync);
                    sim.notify(SessionNotice::OutOfSync {
                        tick: desync.tick,
                        live: desync.live,
                        recorded: desync.recorded,
                    });
                }
                if self.policy == DesyncPolicy::Strict {
                    self.state = PlayerState::Desynced;
                    sim.set_observer(false);
                    return report;
                }
            }

            match Self::resolve(rec, sim) {
                Ok(cmd) => {
                    tracing::trace!(tick = %rec.tick, action = %rec.action, "dispatch");
                    report.dispatched.push(cmd.tag());
                    sim.submit(cmd);
                }
                Err(reason) => {
                    tracing::warn!(tick = %rec.tick, index, %reason, "record skipped");
                    report.skipped.push(SkippedRecord {
                        index,
                        tick: rec.tick,
                        reason,
                    });
                }
            }
            self.cursor += 1;
        }

        if self.cursor >= self.log.len() {
            self.state = PlayerState::Exhausted;
            self.announce_end(sim, &mut report);
        }
        report
    }

    /// Check the actor and build the dispatch command for a record.
    fn resolve<S: Simulation + ?Sized>(
        rec: &rewind_core::CommandRecord,
        sim: &S,
    ) -> Result<SimCommand, DispatchError> {
        let cmd = SimCommand::from_record(rec)?;
        if let Some(slot) = rec.actor_slot {
            match sim.unit_type_tag(slot) {
                None => return Err(DispatchError::UnknownActor { slot }),
                Some(live) if !rec.actor_type_tag.is_empty() && live != rec.actor_type_tag => {
                    return Err(DispatchError::ActorMismatch {
                        slot,
                        recorded: rec.actor_type_tag.clone(),
                        live,
                    })
                }
                Some(_) => {}
            }
        }
        Ok(cmd)
    }

    fn announce_end<S: Simulation + ?Sized>(&mut self, sim: &mut S, report: &mut StepReport) {
        if self.end_announced {
            return;
        }
        self.end_announced = true;
        report.finished = true;
        tracing::info!(records = self.log.len(), "end of replay");
        sim.notify(SessionNotice::EndOfReplay);
        sim.set_observer(false);
    }

    /// Drop the loaded log and return to `Idle`.
    pub fn reset(&mut self) {
        let policy = self.policy;
        *self = Self::new(policy);
    }

    /// Current state.
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Whether the player will never dispatch again.
    pub fn is_finished(&self) -> bool {
        match self.state {
            PlayerState::Exhausted => self.end_announced,
            PlayerState::Desynced => true,
            _ => false,
        }
    }

    /// Tick of the next pending record.
    pub fn next_due(&self) -> Option<TickId> {
        self.log.get(self.cursor).map(|r| r.tick)
    }

    /// Whether a checksum mismatch has been seen.
    pub fn is_out_of_sync(&self) -> bool {
        self.first_desync.is_some()
    }

    /// The first checksum mismatch, if any.
    pub fn first_desync(&self) -> Option<DesyncReport> {
        self.first_desync
    }

    /// Index of the next pending record.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Records not yet consumed.
    pub fn remaining(&self) -> usize {
        self.log.len().saturating_sub(self.cursor)
    }

    /// The loaded log.
    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    /// Mismatch policy.
    pub fn policy(&self) -> DesyncPolicy {
        self.policy
    }
}
