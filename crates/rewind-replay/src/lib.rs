//! Command log recording and deterministic replay for Rewind.
//!
//! Records every player-issued command with the tick it was issued on
//! and the sync checksum at that moment, persists the stream to a
//! line-oriented text log, and feeds it back to the simulation tick by
//! tick on playback.
//!
//! # Architecture
//!
//! - [`Recorder`] stamps live commands and appends them through a [`LogWriter`]
//! - [`encode`] / [`decode`] convert between logs and their text form
//! - [`read_log_file`] loads a log from disk
//! - [`Player`] steps a loaded log against the live simulation
//! - [`checksum_matches`] and [`replay_to_end`] verify determinism
//!
//! # Format
//!
//! ```text
//! --- MODULE: replay list
//! ReplayLog( { Comment1 = "...", ..., Players = { ... }, Engine = { 5, 1, 0 }, ... } )
//! Log( { GameCycle = 10, UnitNumber = 0, Action = "move", Flush = 1, PosX = 5, PosY = 5, SyncRandSeed = 1234 } )
//! ...
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod desync;
pub mod error;
pub mod hash;
pub mod player;
pub mod reader;
pub mod recorder;
pub mod table;
pub mod writer;

pub use codec::{decode, encode, encode_header, encode_record, DecodeMode};
pub use desync::{check, checksum_matches, replay_to_end, DesyncReport, ReplaySummary};
pub use error::ReplayError;
pub use hash::{header_hash, log_hash, record_hash};
pub use player::{DesyncPolicy, Player, PlayerState, SkippedRecord, StepReport};
pub use reader::{read_log, read_log_file};
pub use recorder::{recording_date, stamp, Recorder, RecorderState};
pub use writer::LogWriter;
