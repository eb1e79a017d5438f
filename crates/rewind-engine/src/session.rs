//! Session lifecycle: recording, replaying, saving.
//!
//! [`SessionController`] owns the session mode, the replay header, the
//! live [`Recorder`], and the replay [`Player`]. It is the only owner of
//! log state; there is no process-wide "current replay".
//!
//! # Mode transitions
//!
//! ```text
//!            begin_recording / first command_log
//! Inactive ──────────────────────────────────────► Recording
//!    ▲ │                                               │
//!    │ │ begin_replay                                  │ end / clear
//!    │ ▼                                               │
//! Replaying ──── end / clear ──────────────────────────┴──► Inactive
//! ```
//!
//! A failed [`begin_replay`](SessionController::begin_replay) leaves the
//! controller `Inactive`.

use std::fs;
use std::path::{Path, PathBuf};

use rewind_core::{
    CommandRecord, CommandRequest, ReplayHeader, SessionKind, SessionSetup, Simulation, TickId,
};
use rewind_replay::{read_log_file, recording_date, Player, Recorder, ReplayError, StepReport};

use crate::config::SessionConfig;
use crate::error::{ConfigError, SessionError};
use crate::metrics::SessionMetrics;

// ── SessionMode ─────────────────────────────────────────────────

/// What the session is currently doing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionMode {
    /// Neither recording nor replaying.
    #[default]
    Inactive,
    /// Live commands are being recorded.
    Recording,
    /// A loaded log is being stepped.
    Replaying,
}

// ── ExitState ───────────────────────────────────────────────────

/// Integer outcome of a driver hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitState {
    /// The operation succeeded.
    Success = 0,
    /// The operation failed; the reason was logged.
    Failure = -1,
}

impl ExitState {
    /// The integer code: `0` or `-1`.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Whether this is [`ExitState::Success`].
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl<T, E> From<&Result<T, E>> for ExitState {
    fn from(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(_) => Self::Failure,
        }
    }
}

// ── SessionController ───────────────────────────────────────────

/// Owner of one session's recording and replay state.
#[derive(Debug)]
pub struct SessionController {
    config: SessionConfig,
    mode: SessionMode,
    recorder: Recorder,
    player: Player,
    replay_header: Option<ReplayHeader>,
    replay_path: Option<PathBuf>,
    metrics: SessionMetrics,
}

impl SessionController {
    /// Create an inactive controller.
    ///
    /// Validates `config`. Live logs go to
    /// [`SessionConfig::effective_log_dir`]; nothing is created on disk
    /// until the first command is recorded.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut recorder = Recorder::new(config.effective_log_dir(), config.file_stem.clone());
        recorder.set_enabled(config.recording_enabled);
        Ok(Self {
            player: Player::new(config.desync_policy),
            recorder,
            config,
            mode: SessionMode::Inactive,
            replay_header: None,
            replay_path: None,
            metrics: SessionMetrics::default(),
        })
    }

    /// Start recording a live session described by `setup`.
    ///
    /// Any previous session is ended first. The header is built now; the
    /// log file is created on the first recorded command.
    pub fn begin_recording(&mut self, setup: &SessionSetup) {
        if let Err(e) = self.teardown() {
            tracing::warn!(error = %e, "previous session did not close cleanly");
        }
        self.recorder.set_enabled(self.config.recording_enabled);
        let header = ReplayHeader::from_setup(setup, recording_date());
        self.recorder.set_header(header);
        self.mode = SessionMode::Recording;
        tracing::info!(
            kind = ?setup.kind,
            seat = %setup.local_seat,
            map = %setup.map,
            "recording session started"
        );
    }

    /// Record one live command.
    ///
    /// While inactive, the first recorded command starts a recording
    /// session with a header synthesized from `sim`. While replaying,
    /// nothing is recorded. Returns the appended record, if any.
    ///
    /// # Errors
    ///
    /// [`ReplayError::LogFileUnavailable`] once, when the log file cannot
    /// be created; later calls in the same session return `Ok(None)`
    /// without touching the file system. See [`Recorder::record`].
    pub fn command_log<S: Simulation + ?Sized>(
        &mut self,
        sim: &S,
        request: &CommandRequest,
    ) -> Result<Option<CommandRecord>, SessionError> {
        if self.mode == SessionMode::Replaying {
            return Ok(None);
        }
        let result = self.recorder.record(sim, request).map(|r| r.cloned());
        if self.mode == SessionMode::Inactive && self.recorder.header().is_some() {
            self.mode = SessionMode::Recording;
            tracing::info!("recording session started on first command");
        }
        let record = result?;
        if record.is_some() {
            self.metrics.records_written += 1;
        }
        Ok(record)
    }

    /// Load the log at `path` and start replaying it against `sim`.
    ///
    /// Any previous session is ended first. On success recording is
    /// disabled, the recorded setup and seat names are applied to `sim`,
    /// the map is revealed to the viewer if `reveal` is set, and `sim` is
    /// put in observer mode.
    ///
    /// # Errors
    ///
    /// Any [`read_log_file`] error. The controller is left `Inactive`.
    pub fn begin_replay<S: Simulation + ?Sized>(
        &mut self,
        path: &Path,
        reveal: bool,
        sim: &mut S,
    ) -> Result<(), SessionError> {
        if let Err(e) = self.teardown() {
            tracing::warn!(error = %e, "previous session did not close cleanly");
        }
        let (header, log) = match read_log_file(path, self.config.decode_mode) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot load replay");
                return Err(e.into());
            }
        };
        self.recorder.set_enabled(false);

        let live = sim.describe_session();
        if live.engine != header.engine || live.network != header.network {
            tracing::warn!(
                recorded_engine = %header.engine,
                live_engine = %live.engine,
                recorded_network = %header.network,
                live_network = %live.network,
                "replay was recorded by a different version"
            );
        }
        sim.apply_setup(&header.setup());
        self.player.load(&header, log, sim);
        sim.set_reveal_map(reveal);
        sim.set_observer(true);

        tracing::info!(
            path = %path.display(),
            kind = ?header.kind,
            reveal,
            records = self.player.log().len(),
            "replay session started"
        );
        self.replay_header = Some(header);
        self.replay_path = Some(path.to_path_buf());
        self.mode = SessionMode::Replaying;
        Ok(())
    }

    /// Close the log file, drop the header and log, and go `Inactive`.
    ///
    /// Recording stays disabled after a replay; see
    /// [`clear`](SessionController::clear).
    ///
    /// # Errors
    ///
    /// [`ReplayError::Io`] if the final flush fails. The session is
    /// ended regardless.
    pub fn end(&mut self) -> Result<(), SessionError> {
        let was = self.mode;
        let closed = self.teardown();
        if was != SessionMode::Inactive {
            tracing::info!(mode = ?was, "session ended");
        }
        closed
    }

    /// [`end`](SessionController::end) the session, re-enable recording,
    /// hide the map again, and take `sim` out of observer mode.
    pub fn clear<S: Simulation + ?Sized>(&mut self, sim: &mut S) -> Result<(), SessionError> {
        let closed = self.end();
        self.recorder.set_enabled(self.config.recording_enabled);
        sim.set_reveal_map(false);
        sim.set_observer(false);
        closed
    }

    fn teardown(&mut self) -> Result<(), SessionError> {
        let closed = self.recorder.reset();
        self.player.reset();
        self.replay_header = None;
        self.replay_path = None;
        self.mode = SessionMode::Inactive;
        closed.map_err(SessionError::from)
    }

    /// Copy the session's log file to `<log dir>/<name>`.
    ///
    /// The name is checked before any I/O. Returns the destination path.
    ///
    /// # Errors
    ///
    /// [`ReplayError::InvalidDestination`] for an empty name, `.` or
    /// `..`, or a name containing `/` or `\`;
    /// [`ReplayError::NoBackingLog`] when no file backs the session;
    /// [`ReplayError::Io`] when the copy fails.
    pub fn save_as(&mut self, name: &str) -> Result<PathBuf, SessionError> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            tracing::warn!(name, "rejected replay destination");
            return Err(ReplayError::InvalidDestination {
                name: name.to_string(),
            }
            .into());
        }
        self.recorder.flush()?;
        let source = self
            .backing_log()
            .ok_or(ReplayError::NoBackingLog)?
            .to_path_buf();
        let dir = self.config.effective_log_dir();
        let dest = dir.join(name);
        // Copying a file onto itself truncates it.
        if !same_file(&source, &dest) {
            fs::create_dir_all(&dir).map_err(ReplayError::from)?;
            fs::copy(&source, &dest).map_err(ReplayError::from)?;
        }
        tracing::info!(from = %source.display(), to = %dest.display(), "replay saved");
        Ok(dest)
    }

    /// Dispatch the replayed commands due at `tick`.
    ///
    /// Returns an empty report unless a replay is active.
    pub fn step_replay<S: Simulation + ?Sized>(&mut self, tick: TickId, sim: &mut S) -> StepReport {
        if self.mode != SessionMode::Replaying {
            return StepReport::default();
        }
        let report = self.player.advance(tick, sim);
        self.metrics.commands_dispatched += report.dispatched.len() as u64;
        self.metrics.records_skipped += report.skipped.len() as u64;
        if report.desync.is_some() {
            self.metrics.desync_events += 1;
        }
        report
    }

    /// [`step_replay`](SessionController::step_replay), only if the
    /// loaded replay is a single-seat session.
    pub fn step_single_seat<S: Simulation + ?Sized>(
        &mut self,
        tick: TickId,
        sim: &mut S,
    ) -> StepReport {
        self.step_for(SessionKind::SingleSeat, tick, sim)
    }

    /// [`step_replay`](SessionController::step_replay), only if the
    /// loaded replay is a multi-seat session.
    pub fn step_multi_seat<S: Simulation + ?Sized>(
        &mut self,
        tick: TickId,
        sim: &mut S,
    ) -> StepReport {
        self.step_for(SessionKind::MultiSeat, tick, sim)
    }

    fn step_for<S: Simulation + ?Sized>(
        &mut self,
        kind: SessionKind,
        tick: TickId,
        sim: &mut S,
    ) -> StepReport {
        match &self.replay_header {
            Some(h) if h.kind == kind => self.step_replay(tick, sim),
            _ => StepReport::default(),
        }
    }

    /// Current mode.
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Whether a replay is loaded.
    pub fn is_replaying(&self) -> bool {
        self.mode == SessionMode::Replaying
    }

    /// Header of the loaded replay, or of the live recording once known.
    pub fn header(&self) -> Option<&ReplayHeader> {
        self.replay_header.as_ref().or(self.recorder.header())
    }

    /// The file backing this session: the live log while recording, the
    /// loaded file while replaying.
    pub fn backing_log(&self) -> Option<&Path> {
        self.recorder.path().or(self.replay_path.as_deref())
    }

    /// The live recorder.
    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// The replay stepper.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Configuration in use.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Cumulative counters.
    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }
}

/// Whether `a` and `b` name the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_core::{ActionTag, SeatId, SessionNotice, SimCommand, SlotId};
    use rewind_replay::{PlayerState, RecorderState};
    use rewind_test_utils::{init_tracing, sample_setup, scratch_dir, MockSimulation};

    fn controller(name: &str) -> SessionController {
        init_tracing();
        SessionController::new(SessionConfig::new(scratch_dir(name))).unwrap()
    }

    fn sim() -> MockSimulation {
        MockSimulation::new(77).with_standard_units()
    }

    fn move_to(x: i32, y: i32) -> CommandRequest {
        CommandRequest::new(ActionTag::Move)
            .actor(SlotId(0))
            .position((x, y))
            .flush(1)
    }

    /// Record two moves on ticks 3 and 5 and return the log path.
    fn recorded_log(name: &str) -> (SessionController, PathBuf) {
        let mut c = controller(name);
        let mut live = sim();
        c.begin_recording(&sample_setup());
        for (tick, req) in [(3, move_to(1, 1)), (5, move_to(2, 2))] {
            live.run_to(TickId(tick));
            let rec = c.command_log(&live, &req).unwrap().unwrap();
            live.submit(SimCommand::from_record(&rec).unwrap());
        }
        let path = c.backing_log().unwrap().to_path_buf();
        (c, path)
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = SessionConfig {
            file_stem: String::new(),
            ..SessionConfig::default()
        };
        assert!(matches!(
            SessionController::new(cfg),
            Err(ConfigError::EmptyFileStem)
        ));
    }

    #[test]
    fn exit_state_codes() {
        let ok: Result<(), ()> = Ok(());
        let err: Result<(), ()> = Err(());
        assert_eq!(ExitState::from(&ok).code(), 0);
        assert_eq!(ExitState::from(&err).code(), -1);
        assert!(ExitState::Success.is_success());
    }

    #[test]
    fn first_command_starts_recording() {
        let mut c = controller("session_lazy");
        let live = sim();
        assert_eq!(c.mode(), SessionMode::Inactive);
        let rec = c.command_log(&live, &move_to(4, 4)).unwrap().unwrap();
        assert_eq!(rec.actor_type_tag, "unit-footman");
        assert_eq!(c.mode(), SessionMode::Recording);
        assert_eq!(c.recorder().state(), RecorderState::Open);
        let path = c.backing_log().unwrap();
        assert!(path.ends_with("logs/log_of_rewind_0.log"));
        assert_eq!(c.metrics().records_written, 1);
    }

    #[test]
    fn begin_recording_uses_given_setup() {
        let mut c = controller("session_setup");
        let mut setup = sample_setup();
        setup.map = "Frozen Lake".into();
        c.begin_recording(&setup);
        c.command_log(&sim(), &CommandRequest::probe()).unwrap();
        let (header, log) =
            read_log_file(c.backing_log().unwrap(), Default::default()).unwrap();
        assert_eq!(header.map, "Frozen Lake");
        assert!(log.is_empty());
    }

    #[test]
    fn disabled_recording_stays_inactive() {
        init_tracing();
        let cfg = SessionConfig {
            recording_enabled: false,
            ..SessionConfig::new(scratch_dir("session_disabled"))
        };
        let mut c = SessionController::new(cfg).unwrap();
        assert_eq!(c.command_log(&sim(), &move_to(1, 1)).unwrap(), None);
        assert_eq!(c.mode(), SessionMode::Inactive);
        assert!(c.backing_log().is_none());
    }

    #[test]
    fn missing_file_leaves_session_inactive() {
        let mut c = controller("session_missing");
        let mut twin = sim();
        let err = c
            .begin_replay(Path::new("/nonexistent/rewind.log"), false, &mut twin)
            .unwrap_err();
        assert!(matches!(err.as_replay(), Some(ReplayError::Io(_))));
        assert_eq!(c.mode(), SessionMode::Inactive);
        assert!(!twin.observer);
        assert!(twin.applied_setup.is_none());
    }

    #[test]
    fn replay_applies_setup_and_observes() {
        let (mut rec, path) = recorded_log("session_replay");
        rec.end().unwrap();

        let mut c = controller("session_replay_b");
        let mut twin = sim();
        c.begin_replay(&path, false, &mut twin).unwrap();
        assert_eq!(c.mode(), SessionMode::Replaying);
        assert!(twin.observer);
        assert_eq!(
            twin.applied_setup.as_ref().map(|s| s.map.as_str()),
            Some("Twin Fords")
        );
        assert_eq!(
            twin.seat_names.get(&SeatId(1)).map(String::as_str),
            Some("Grace")
        );
        assert_eq!(c.player().state(), PlayerState::Primed);
        assert_eq!(c.backing_log(), Some(path.as_path()));

        // Recording is off while replaying.
        assert_eq!(c.command_log(&twin, &move_to(9, 9)).unwrap(), None);
        assert_eq!(c.recorder().state(), RecorderState::Disabled);
    }

    #[test]
    fn stepping_dispatches_and_counts() {
        let (mut rec, path) = recorded_log("session_step");
        rec.end().unwrap();

        let mut c = controller("session_step_b");
        let mut twin = sim();
        c.begin_replay(&path, false, &mut twin).unwrap();
        for _ in 0..8 {
            let tick = twin.tick;
            c.step_replay(tick, &mut twin);
            twin.step();
        }
        assert_eq!(c.metrics().commands_dispatched, 2);
        assert_eq!(c.metrics().desync_events, 0);
        assert_eq!(c.player().state(), PlayerState::Exhausted);
        assert_eq!(twin.notices, vec![SessionNotice::EndOfReplay]);
        assert!(!twin.observer);
    }

    #[test]
    fn step_gated_by_session_kind() {
        let (mut rec, path) = recorded_log("session_kind");
        rec.end().unwrap();

        let mut c = controller("session_kind_b");
        let mut twin = sim();
        c.begin_replay(&path, false, &mut twin).unwrap();
        twin.run_to(TickId(3));
        assert!(c.step_multi_seat(TickId(3), &mut twin).is_empty());
        let report = c.step_single_seat(TickId(3), &mut twin);
        assert_eq!(report.dispatched.as_slice(), &[ActionTag::Move]);
    }

    #[test]
    fn step_without_replay_is_noop() {
        let mut c = controller("session_idle_step");
        let mut twin = sim();
        assert!(c.step_replay(TickId(0), &mut twin).is_empty());
        assert!(twin.submitted.is_empty());
    }

    #[test]
    fn save_as_rejects_bad_names_before_io() {
        let mut c = controller("session_bad_names");
        for name in ["", ".", "..", "../up", "sub/dir.log", "c:\\x.log"] {
            let err = c.save_as(name).unwrap_err();
            assert!(
                matches!(err.as_replay(), Some(ReplayError::InvalidDestination { .. })),
                "{name:?}: {err}"
            );
        }
        assert!(!c.config().effective_log_dir().exists());
    }

    #[test]
    fn save_as_without_log_fails() {
        let mut c = controller("session_no_log");
        let err = c.save_as("keep.log").unwrap_err();
        assert!(matches!(err.as_replay(), Some(ReplayError::NoBackingLog)));
    }

    #[test]
    fn save_as_copies_log() {
        let (mut c, path) = recorded_log("session_save");
        let dest = c.save_as("keep.log").unwrap();
        assert_eq!(dest, c.config().effective_log_dir().join("keep.log"));
        assert_eq!(
            fs::read_to_string(&dest).unwrap(),
            fs::read_to_string(&path).unwrap()
        );
        assert_eq!(c.mode(), SessionMode::Recording);
    }

    #[test]
    fn save_as_onto_itself_keeps_content() {
        let (mut c, path) = recorded_log("session_save_self");
        let before = fs::read_to_string(&path).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        c.save_as(&name).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn save_as_through_aliased_path_keeps_content() {
        let (mut rec, path) = recorded_log("session_save_alias");
        rec.end().unwrap();

        let mut c = controller("session_save_alias_b");
        let logs = c.config().effective_log_dir();
        fs::create_dir_all(&logs).unwrap();
        fs::copy(&path, logs.join("keep.log")).unwrap();
        let before = fs::read_to_string(logs.join("keep.log")).unwrap();

        let aliased = logs.join("..").join("logs").join("keep.log");
        let mut twin = sim();
        c.begin_replay(&aliased, false, &mut twin).unwrap();
        assert_eq!(c.save_as("keep.log").unwrap(), logs.join("keep.log"));
        assert_eq!(fs::read_to_string(logs.join("keep.log")).unwrap(), before);
    }

    #[test]
    fn reveal_lasts_until_clear() {
        let (mut rec, path) = recorded_log("session_reveal");
        rec.end().unwrap();

        let mut c = controller("session_reveal_b");
        let mut twin = sim();
        c.begin_replay(&path, true, &mut twin).unwrap();
        assert!(twin.revealed);
        c.clear(&mut twin).unwrap();
        assert!(!twin.revealed);

        c.begin_replay(&path, false, &mut twin).unwrap();
        assert!(!twin.revealed);
    }

    #[test]
    fn failed_replay_leaves_map_hidden() {
        let mut c = controller("session_reveal_missing");
        let mut twin = sim();
        assert!(c
            .begin_replay(Path::new("/nonexistent/rewind.log"), true, &mut twin)
            .is_err());
        assert!(!twin.revealed);
    }

    #[test]
    fn end_releases_state() {
        let (mut c, _) = recorded_log("session_end");
        c.end().unwrap();
        assert_eq!(c.mode(), SessionMode::Inactive);
        assert!(c.header().is_none());
        assert!(c.backing_log().is_none());
        assert!(c.recorder().log().is_empty());
    }

    #[test]
    fn clear_after_replay_restores_recording() {
        let (mut rec, path) = recorded_log("session_clear");
        rec.end().unwrap();

        let mut c = controller("session_clear_b");
        let mut twin = sim();
        c.begin_replay(&path, false, &mut twin).unwrap();
        c.end().unwrap();
        assert_eq!(c.recorder().state(), RecorderState::Disabled);

        c.clear(&mut twin).unwrap();
        assert!(!twin.observer);
        assert_eq!(c.recorder().state(), RecorderState::Pending);
        assert!(c.command_log(&twin, &move_to(1, 2)).unwrap().is_some());
    }
}
