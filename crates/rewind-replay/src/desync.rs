//! Desync detection and headless replay verification.
//!
//! Every record carries the sync checksum observed when it was issued.
//! During playback the live checksum is compared against it before the
//! record is dispatched; the first mismatch marks the replay out of sync.

use std::fmt;

use rewind_core::{Simulation, TickId};

use crate::player::{Player, PlayerState};

/// Whether a live checksum agrees with a recorded one.
///
/// A record without a checksum carries no information and always
/// matches.
pub fn checksum_matches(live: u32, recorded: Option<u32>) -> bool {
    recorded.is_none_or(|r| r == live)
}

/// Compare `live` against `recorded` at `tick`.
///
/// Returns `None` when they match.
pub fn check(tick: TickId, live: u32, recorded: Option<u32>) -> Option<DesyncReport> {
    match recorded {
        Some(recorded) if recorded != live => Some(DesyncReport {
            tick,
            live,
            recorded,
        }),
        _ => None,
    }
}

/// A detected divergence between the live simulation and the log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DesyncReport {
    /// Tick of the diverging record.
    pub tick: TickId,
    /// Live sync checksum.
    pub live: u32,
    /// Checksum stored in the record.
    pub recorded: u32,
}

impl fmt::Display for DesyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "replay out of sync at tick {}: live={:#010x}, recorded={:#010x}",
            self.tick, self.live, self.recorded
        )
    }
}

/// Outcome of [`replay_to_end`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Commands submitted to the simulation.
    pub dispatched: usize,
    /// Records reported and skipped.
    pub skipped: usize,
    /// First checksum divergence, if any.
    pub first_desync: Option<DesyncReport>,
    /// Player state when the run stopped.
    pub final_state: PlayerState,
    /// Last tick the player was advanced at.
    pub last_tick: Option<TickId>,
}

impl ReplaySummary {
    /// Whether the whole log dispatched without divergence.
    pub fn is_clean(&self) -> bool {
        self.final_state == PlayerState::Exhausted
            && self.first_desync.is_none()
            && self.skipped == 0
    }
}

/// Drive a loaded player against `sim` until the log is exhausted, the
/// player halts on a desync, or the simulation passes `max_tick`.
///
/// `step_sim` advances the simulation by one tick after the player has
/// dispatched the commands due at the current one. The run also stops
/// if `step_sim` fails to move the tick forward.
pub fn replay_to_end<S, F>(
    player: &mut Player,
    sim: &mut S,
    max_tick: TickId,
    mut step_sim: F,
) -> ReplaySummary
where
    S: Simulation,
    F: FnMut(&mut S),
{
    let mut summary = ReplaySummary {
        dispatched: 0,
        skipped: 0,
        first_desync: None,
        final_state: player.state(),
        last_tick: None,
    };

    loop {
        let tick = sim.current_tick();
        if tick > max_tick {
            break;
        }
        let report = player.advance(tick, sim);
        summary.dispatched += report.dispatched.len();
        summary.skipped += report.skipped.len();
        summary.last_tick = Some(tick);
        if summary.first_desync.is_none() {
            summary.first_desync = report.desync;
        }
        if player.is_finished() {
            break;
        }
        step_sim(sim);
        if sim.current_tick() <= tick {
            tracing::warn!(%tick, "simulation did not advance; stopping headless replay");
            break;
        }
    }

    summary.final_state = player.state();
    summary
}
