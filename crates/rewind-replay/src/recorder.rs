//! Live command recorder.
//!
//! The [`Recorder`] turns each [`CommandRequest`] into a [`CommandRecord`]
//! stamped with the simulation's current tick and sync checksum, keeps
//! it in memory, and appends it to the on-disk log. The log file is
//! created lazily on the first call; if that fails the recorder gives
//! up for the rest of the session.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use rewind_core::{
    CommandLog, CommandRecord, CommandRequest, ReplayHeader, SeatId, Simulation, TilePos,
};

use crate::error::ReplayError;
use crate::writer::LogWriter;

/// Human-readable local date for a new header, in the locale's
/// preferred date-and-time format.
pub fn recording_date() -> String {
    chrono::Local::now().format("%c").to_string()
}

/// Build the record for `request` as the simulation sees it now.
///
/// Tick, checksum, and actor type come from `sim`. Sentinel arguments
/// (`(-1, -1)` position, empty payload, `-1` num) become unset. Returns
/// `None` for a probe request.
pub fn stamp<S: Simulation + ?Sized>(sim: &S, request: &CommandRequest) -> Option<CommandRecord> {
    let action = request.action?;
    let mut record = CommandRecord::new(sim.current_tick(), action);
    if let Some(actor) = request.actor {
        record = record.with_actor(actor, sim.unit_type_tag(actor).unwrap_or_default());
    }
    record.flush = request.flush;
    record.position = request.position.filter(|p| *p != TilePos::new(-1, -1));
    record.target_slot = request.target;
    record.payload = request.payload.clone().filter(|p| !p.is_empty());
    record.num = request.num.filter(|&n| n != -1);
    record.checksum = Some(sim.sync_checksum());
    Some(record)
}

/// Where the recorder is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecorderState {
    /// Recording disabled, e.g. during playback.
    Disabled,
    /// Enabled; the log file will be created by the next call.
    Pending,
    /// Log file open and receiving records.
    Open,
    /// File creation or a write failed; nothing more is recorded.
    Failed,
}

/// Records live commands to memory and to a log file.
#[derive(Debug)]
pub struct Recorder {
    dir: PathBuf,
    file_stem: String,
    enabled: bool,
    failed: bool,
    header: Option<ReplayHeader>,
    log: CommandLog,
    path: Option<PathBuf>,
    writer: Option<LogWriter<BufWriter<File>>>,
}

impl Recorder {
    /// An enabled recorder writing `<dir>/<file_stem>_<seat>.log`.
    pub fn new(dir: impl Into<PathBuf>, file_stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_stem: file_stem.into(),
            enabled: true,
            failed: false,
            header: None,
            log: CommandLog::new(),
            path: None,
            writer: None,
        }
    }

    /// Use `header` instead of synthesizing one from the simulation.
    ///
    /// Only takes effect before the log file is created.
    pub fn set_header(&mut self, header: ReplayHeader) {
        if self.writer.is_none() {
            self.header = Some(header);
        }
    }

    /// Enable or disable recording.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether calls to [`record`](Recorder::record) can still append.
    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.failed
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RecorderState {
        if self.failed {
            RecorderState::Failed
        } else if !self.enabled {
            RecorderState::Disabled
        } else if self.writer.is_some() {
            RecorderState::Open
        } else {
            RecorderState::Pending
        }
    }

    /// Path of the log file that will be or was created for `seat`.
    pub fn path_for(&self, seat: SeatId) -> PathBuf {
        self.dir.join(format!("{}_{seat}.log", self.file_stem))
    }

    /// Record one command.
    ///
    /// A request without an action only makes sure the log file and its
    /// header exist. Returns the appended record, or `None` when nothing
    /// was appended.
    ///
    /// # Errors
    ///
    /// [`ReplayError::LogFileUnavailable`] the first time the log file
    /// cannot be created, [`ReplayError::Io`] when a write fails, and
    /// [`ReplayError::Core`] when the simulation's tick moved backwards.
    /// After an I/O error the recorder is [`RecorderState::Failed`] and
    /// later calls return `Ok(None)`.
    pub fn record<S: Simulation + ?Sized>(
        &mut self,
        sim: &S,
        request: &CommandRequest,
    ) -> Result<Option<&CommandRecord>, ReplayError> {
        if !self.is_enabled() {
            return Ok(None);
        }
        if self.writer.is_none() {
            self.open(sim)?;
        }
        let Some(record) = stamp(sim, request) else {
            return Ok(None);
        };

        // Memory never holds a record the file lacks.
        self.log.check_next(record.tick)?;
        if let Some(writer) = self.writer.as_mut() {
            if let Err(e) = writer.append(&record) {
                tracing::warn!(error = %e, "log write failed; recording disabled");
                self.fail();
                return Err(e);
            }
        }
        tracing::debug!(tick = %record.tick, action = %record.action, "command recorded");
        self.log.push(record)?;
        Ok(self.log.records().last())
    }

    fn open<S: Simulation + ?Sized>(&mut self, sim: &S) -> Result<(), ReplayError> {
        let header = match self.header.take() {
            Some(h) => h,
            None => ReplayHeader::from_setup(&sim.describe_session(), recording_date()),
        };
        let path = self.path_for(header.local_seat);
        match Self::create(&self.dir, &path, &header) {
            Ok(writer) => {
                tracing::info!(path = %path.display(), "replay log created");
                self.writer = Some(writer);
                self.path = Some(path);
                self.header = Some(header);
                Ok(())
            }
            Err(source) => {
                tracing::warn!(path = %path.display(), error = %source, "cannot create replay log");
                self.header = Some(header);
                self.fail();
                Err(ReplayError::LogFileUnavailable { path, source })
            }
        }
    }

    fn create(
        dir: &Path,
        path: &Path,
        header: &ReplayHeader,
    ) -> Result<LogWriter<BufWriter<File>>, std::io::Error> {
        fs::create_dir_all(dir)?;
        let file = File::create(path)?;
        LogWriter::new(BufWriter::new(file), header).map_err(|e| match e {
            ReplayError::Io(io) => io,
            other => std::io::Error::other(other.to_string()),
        })
    }

    fn fail(&mut self) {
        self.failed = true;
        self.writer = None;
    }

    /// Flush the log file, if open.
    pub fn flush(&mut self) -> Result<(), ReplayError> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    /// Close the file and forget everything recorded. The recorder is
    /// `Pending` again if it was enabled.
    pub fn reset(&mut self) -> Result<(), ReplayError> {
        let closed = match self.writer.take() {
            Some(mut writer) => writer.flush(),
            None => Ok(()),
        };
        self.failed = false;
        self.header = None;
        self.log = CommandLog::new();
        self.path = None;
        closed
    }

    /// The header written to the log, once the file exists.
    pub fn header(&self) -> Option<&ReplayHeader> {
        self.header.as_ref()
    }

    /// Records appended so far.
    pub fn log(&self) -> &CommandLog {
        &self.log
    }

    /// Path of the log file, once created.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Directory the log file is created in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
