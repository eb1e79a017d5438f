//! Lockstep tick driver and session-facing hooks.
//!
//! [`LockstepDriver`] is what the embedding game-cycle driver talks to.
//! Each call to [`run_tick()`](LockstepDriver::run_tick) drains the
//! network [`CommandInbox`], records and executes the drained commands in
//! deterministic order, then steps any loaded replay.
//!
//! The remaining methods are thin hooks over the [`SessionController`]
//! for callers that only need an [`ExitState`].
//!
//! # Ownership model
//!
//! `LockstepDriver` is [`Send`] but all mutating methods take `&mut self`.
//! Network tasks never touch it directly; they submit through an
//! [`InboxSender`] obtained from [`sender()`](LockstepDriver::sender).

use std::path::Path;

use rewind_core::{
    CommandRecord, CommandRequest, DispatchError, SessionSetup, SimCommand, Simulation, TickId,
};
use rewind_replay::{stamp, StepReport};

use crate::config::SessionConfig;
use crate::error::{ConfigError, SessionError};
use crate::ingress::{CommandInbox, InboxCommand, InboxSender};
use crate::metrics::SessionMetrics;
use crate::session::{ExitState, SessionController, SessionMode};

// Compile-time assertion: LockstepDriver is Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<LockstepDriver>();
    }
};

// ── TickOutcome ─────────────────────────────────────────────────

/// Result of one [`LockstepDriver::run_tick()`] call.
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// Commands taken from the inbox.
    pub drained: usize,
    /// Drained commands appended to the live log.
    pub recorded: usize,
    /// Drained commands submitted to the simulation.
    pub executed: usize,
    /// Drained commands that could not be turned into a simulation command.
    pub rejected: Vec<(InboxCommand, DispatchError)>,
    /// Recording failure raised this tick, if any.
    pub record_error: Option<SessionError>,
    /// What the replay stepper did this tick.
    pub replay: StepReport,
}

// ── LockstepDriver ──────────────────────────────────────────────

/// Per-tick entry point combining the command inbox and the session.
#[derive(Debug)]
pub struct LockstepDriver {
    session: SessionController,
    inbox: CommandInbox,
}

impl LockstepDriver {
    /// Create a driver from a [`SessionConfig`].
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        let session = SessionController::new(config)?;
        let inbox = CommandInbox::new(session.config().inbox_capacity);
        Ok(Self { session, inbox })
    }

    /// A handle for network tasks to submit commands with.
    pub fn sender(&self) -> InboxSender {
        self.inbox.sender()
    }

    /// Run the session side of one tick.
    ///
    /// Drains the inbox; unless a replay is active, each command is
    /// recorded and then submitted to `sim`, in inbox order. Then steps
    /// any loaded replay at `tick`. Commands drained during a replay are
    /// dropped.
    pub fn run_tick<S: Simulation + ?Sized>(&mut self, tick: TickId, sim: &mut S) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        let drained = self.inbox.drain();
        outcome.drained = drained.len();

        if self.session.mode() == SessionMode::Replaying {
            if !drained.is_empty() {
                tracing::warn!(%tick, count = drained.len(), "live commands dropped during replay");
            }
        } else {
            for cmd in drained {
                self.execute(cmd, sim, &mut outcome);
            }
        }

        outcome.replay = self.session.step_replay(tick, sim);
        outcome
    }

    fn execute<S: Simulation + ?Sized>(
        &mut self,
        cmd: InboxCommand,
        sim: &mut S,
        outcome: &mut TickOutcome,
    ) {
        let record = match self.session.command_log(&*sim, &cmd.request) {
            Ok(Some(rec)) => {
                outcome.recorded += 1;
                Some(rec)
            }
            Ok(None) => stamp(&*sim, &cmd.request),
            Err(e) => {
                tracing::warn!(seat = %cmd.seat, error = %e, "command not recorded");
                outcome.record_error = Some(e);
                stamp(&*sim, &cmd.request)
            }
        };
        let Some(record) = record else {
            return;
        };
        match SimCommand::from_record(&record) {
            Ok(sim_cmd) => {
                tracing::trace!(seat = %cmd.seat, action = %record.action, "command executed");
                sim.submit(sim_cmd);
                outcome.executed += 1;
            }
            Err(reason) => {
                tracing::warn!(seat = %cmd.seat, %reason, "command rejected");
                outcome.rejected.push((cmd, reason));
            }
        }
    }

    // ── Session hooks ───────────────────────────────────────────

    /// Start recording a live session. See
    /// [`SessionController::begin_recording`].
    pub fn begin_recording(&mut self, setup: &SessionSetup) {
        self.session.begin_recording(setup);
    }

    /// Record one command issued outside the inbox, without executing it.
    pub fn command_log<S: Simulation + ?Sized>(
        &mut self,
        sim: &S,
        request: &CommandRequest,
    ) -> Result<Option<CommandRecord>, SessionError> {
        self.session.command_log(sim, request)
    }

    /// Load and start a replay, optionally with the whole map revealed.
    /// Pending inbox commands are discarded.
    pub fn begin_replay<S: Simulation + ?Sized>(
        &mut self,
        path: &Path,
        reveal: bool,
        sim: &mut S,
    ) -> ExitState {
        let dropped = self.inbox.clear();
        if dropped > 0 {
            tracing::debug!(dropped, "inbox cleared for replay");
        }
        ExitState::from(&self.session.begin_replay(path, reveal, sim))
    }

    /// Step the loaded replay without touching the inbox.
    pub fn step_replay<S: Simulation + ?Sized>(&mut self, tick: TickId, sim: &mut S) -> StepReport {
        self.session.step_replay(tick, sim)
    }

    /// Copy the session's log to `name` in the log directory.
    pub fn save_replay(&mut self, name: &str) -> ExitState {
        let result = self.session.save_as(name);
        if let Err(e) = &result {
            tracing::warn!(name, error = %e, "replay not saved");
        }
        ExitState::from(&result)
    }

    /// End the session and discard pending inbox commands.
    pub fn end_replay(&mut self) {
        self.inbox.clear();
        if let Err(e) = self.session.end() {
            tracing::warn!(error = %e, "session did not close cleanly");
        }
    }

    /// End the session, re-enable recording, and leave observer mode
    /// with the map hidden again.
    pub fn clear_replay_state<S: Simulation + ?Sized>(&mut self, sim: &mut S) {
        self.inbox.clear();
        if let Err(e) = self.session.clear(sim) {
            tracing::warn!(error = %e, "session did not close cleanly");
        }
    }

    // ── Accessors ───────────────────────────────────────────────

    /// The session controller.
    pub fn session(&self) -> &SessionController {
        &self.session
    }

    /// Mutable access to the session controller.
    pub fn session_mut(&mut self) -> &mut SessionController {
        &mut self.session
    }

    /// The command inbox.
    pub fn inbox(&self) -> &CommandInbox {
        &self.inbox
    }

    /// Cumulative counters, including inbox rejections.
    pub fn metrics(&self) -> SessionMetrics {
        SessionMetrics {
            inbox_rejections: self.inbox.rejections(),
            ..self.session.metrics().clone()
        }
    }
}
