//! The seam between the replay subsystem and the externally owned
//! simulation.

use crate::command::SimCommand;
use crate::header::SessionSetup;
use crate::id::{SeatId, SlotId, TickId};

/// Player-visible events raised by the replay stepper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionNotice {
    /// The live checksum diverged from the recorded one. Raised at most
    /// once per replay.
    OutOfSync {
        /// Tick of the first diverging record.
        tick: TickId,
        /// Live sync checksum.
        live: u32,
        /// Checksum stored in the record.
        recorded: u32,
    },
    /// Every record has been dispatched.
    EndOfReplay,
}

impl std::fmt::Display for SessionNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfSync {
                tick,
                live,
                recorded,
            } => write!(
                f,
                "replay is out of sync at tick {tick} (live {live:#010x}, recorded {recorded:#010x})"
            ),
            Self::EndOfReplay => f.write_str("end of replay"),
        }
    }
}

/// Capabilities the recorder, stepper, and session controller need from
/// the running simulation.
///
/// The simulation owns the game-cycle counter, the entity table, and the
/// sync random stream; this subsystem only reads them and feeds commands
/// back in. All calls happen on the tick thread.
pub trait Simulation {
    /// The tick currently being simulated.
    fn current_tick(&self) -> TickId;

    /// Current state of the sync random stream.
    fn sync_checksum(&self) -> u32;

    /// Type identifier of the entity in `slot`, or `None` if the slot
    /// is empty.
    fn unit_type_tag(&self, slot: SlotId) -> Option<String>;

    /// Snapshot of the live session, used to build a replay header.
    fn describe_session(&self) -> SessionSetup;

    /// Restore recorded starting conditions before playback.
    fn apply_setup(&mut self, setup: &SessionSetup);

    /// Rename a live seat.
    fn set_seat_name(&mut self, seat: SeatId, name: &str);

    /// Execute one command.
    fn submit(&mut self, command: SimCommand);

    /// Show a notice to the player.
    fn notify(&mut self, notice: SessionNotice);

    /// Enter or leave observer mode.
    fn set_observer(&mut self, observe: bool);

    /// Show or hide the whole map to the local viewer. Playback only;
    /// this never touches simulation state.
    fn set_reveal_map(&mut self, reveal: bool);
}
