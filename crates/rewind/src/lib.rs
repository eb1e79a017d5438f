//! Rewind: deterministic command log recording and replay for lockstep games.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Rewind sub-crates. For most users, adding `rewind` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use rewind::prelude::*;
//! use rewind_test_utils::{sample_setup, MockSimulation};
//!
//! let dir = std::env::temp_dir().join("rewind_doc_quickstart");
//! let mut driver = LockstepDriver::new(SessionConfig::new(&dir)).unwrap();
//!
//! // Record five ticks of a live session.
//! let mut live = MockSimulation::new(1).with_standard_units();
//! driver.begin_recording(&sample_setup());
//! let order = CommandRequest::new(ActionTag::Move)
//!     .actor(SlotId(0))
//!     .position((3, 4));
//! driver.sender().submit(SeatId(0), 0, order).unwrap();
//! for _ in 0..5 {
//!     let tick = live.current_tick();
//!     driver.run_tick(tick, &mut live);
//!     live.step();
//! }
//! assert_eq!(driver.save_replay("quickstart.log"), ExitState::Success);
//! driver.end_replay();
//!
//! // Replay it against a fresh simulation.
//! let path = driver.session().config().effective_log_dir().join("quickstart.log");
//! let mut twin = MockSimulation::new(1).with_standard_units();
//! assert_eq!(driver.begin_replay(&path, false, &mut twin), ExitState::Success);
//! for _ in 0..5 {
//!     let tick = twin.current_tick();
//!     driver.run_tick(tick, &mut twin);
//!     twin.step();
//! }
//! assert_eq!(twin.submitted, live.submitted);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `rewind-core` | IDs, actions, records, header, `Simulation` trait |
//! | [`replay`] | `rewind-replay` | Log codec, recorder, replay stepper, desync checks |
//! | [`engine`] | `rewind-engine` | Session controller, command inbox, lockstep driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`rewind-core`).
///
/// Contains the action vocabulary, command records and logs, the replay
/// header, the sync random stream, and the [`types::Simulation`] trait
/// the embedding engine implements.
pub use rewind_core as types;

/// Log codec, recording, and replay (`rewind-replay`).
///
/// Record live commands with [`replay::Recorder`], load logs with
/// [`replay::read_log_file`], and step them with [`replay::Player`].
pub use rewind_replay as replay;

/// Session control (`rewind-engine`).
///
/// [`engine::SessionController`] owns one session;
/// [`engine::LockstepDriver`] adds the network inbox and per-tick hooks.
pub use rewind_engine as engine;

/// Common imports for typical Rewind usage.
///
/// ```rust
/// use rewind::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use rewind_core::{
        ActionTag, CommandLog, CommandRecord, CommandRequest, ReplayHeader, SeatId, SessionKind,
        SessionNotice, SessionSetup, SimCommand, Simulation, SlotId, SyncRand, TickId, TilePos,
    };

    // Errors
    pub use rewind_core::{CoreError, DispatchError};
    pub use rewind_engine::{ConfigError, IngressError, SessionError};
    pub use rewind_replay::ReplayError;

    // Replay
    pub use rewind_replay::{
        decode, encode, read_log_file, DecodeMode, DesyncPolicy, Player, PlayerState, Recorder,
        StepReport,
    };

    // Engine
    pub use rewind_engine::{
        ExitState, InboxSender, LockstepDriver, SessionConfig, SessionController, SessionMetrics,
        SessionMode, TickOutcome,
    };
}
