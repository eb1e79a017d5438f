//! Test utilities and mock types for Rewind development.
//!
//! Provides a [`MockSimulation`] implementing the [`Simulation`] trait,
//! scripted and seeded command fixtures in [`fixtures`], scratch
//! directories for log files, and [`init_tracing`] for test output.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use rewind_core::{
    SeatId, SessionNotice, SessionSetup, SimCommand, Simulation, SlotId, SyncRand, TickId,
};

pub use fixtures::{
    random_log, random_requests, sample_header, sample_setup, scripted_requests, Script,
};

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Filtered by `RUST_LOG`. Safe to call from every test; only the
/// first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A fresh, empty directory under the system temp dir, unique to
/// `name` and this process.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("rewind_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Deterministic stand-in for the game simulation.
///
/// Every submitted command draws once from the sync random stream, and
/// every [`step`](MockSimulation::step) draws once more, so two mocks
/// that see the same commands on the same ticks end with the same
/// checksum.
#[derive(Clone, Debug)]
pub struct MockSimulation {
    pub tick: TickId,
    pub rng: SyncRand,
    pub units: HashMap<SlotId, String>,
    pub setup: SessionSetup,
    pub applied_setup: Option<SessionSetup>,
    pub seat_names: BTreeMap<SeatId, String>,
    pub submitted: Vec<(TickId, SimCommand)>,
    pub notices: Vec<SessionNotice>,
    pub observer: bool,
    pub revealed: bool,
}

impl MockSimulation {
    pub fn new(seed: u32) -> Self {
        Self {
            tick: TickId(0),
            rng: SyncRand::new(seed),
            units: HashMap::new(),
            setup: fixtures::sample_setup(),
            applied_setup: None,
            seat_names: BTreeMap::new(),
            submitted: Vec::new(),
            notices: Vec::new(),
            observer: false,
            revealed: false,
        }
    }

    /// Place an entity of `type_tag` in `slot`.
    pub fn with_unit(mut self, slot: u32, type_tag: &str) -> Self {
        self.units.insert(SlotId(slot), type_tag.to_string());
        self
    }

    /// The standard cast used by [`fixtures`]: slots 0..8.
    pub fn with_standard_units(mut self) -> Self {
        for (slot, tag) in fixtures::STANDARD_UNITS.iter().enumerate() {
            self.units.insert(SlotId(slot as u32), tag.to_string());
        }
        self
    }

    /// Advance one tick.
    pub fn step(&mut self) {
        self.rng.next_u32();
        self.tick = self.tick.next();
    }

    /// Run until `tick` is current.
    pub fn run_to(&mut self, tick: TickId) {
        while self.tick < tick {
            self.step();
        }
    }

    /// Draw an extra value so this mock diverges from any twin.
    pub fn perturb(&mut self) {
        self.rng.next_u32();
    }
}

impl Simulation for MockSimulation {
    fn current_tick(&self) -> TickId {
        self.tick
    }

    fn sync_checksum(&self) -> u32 {
        self.rng.seed()
    }

    fn unit_type_tag(&self, slot: SlotId) -> Option<String> {
        self.units.get(&slot).cloned()
    }

    fn describe_session(&self) -> SessionSetup {
        self.setup.clone()
    }

    fn apply_setup(&mut self, setup: &SessionSetup) {
        self.applied_setup = Some(setup.clone());
    }

    fn set_seat_name(&mut self, seat: SeatId, name: &str) {
        self.seat_names.insert(seat, name.to_string());
    }

    fn submit(&mut self, command: SimCommand) {
        self.rng.next_u32();
        self.submitted.push((self.tick, command));
    }

    fn notify(&mut self, notice: SessionNotice) {
        self.notices.push(notice);
    }

    fn set_observer(&mut self, observe: bool) {
        self.observer = observe;
    }

    fn set_reveal_map(&mut self, reveal: bool) {
        self.revealed = reveal;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_core::{ActionTag, CommandRecord, TilePos};

    #[test]
    fn twins_stay_in_sync() {
        let mut a = MockSimulation::new(9).with_standard_units();
        let mut b = a.clone();
        let cmd = SimCommand::from_record(
            &CommandRecord::new(TickId(0), ActionTag::Move)
                .with_actor(SlotId(0), "unit-footman")
                .with_position(TilePos::new(1, 1)),
        )
        .unwrap();
        for sim in [&mut a, &mut b] {
            sim.submit(cmd.clone());
            sim.step();
        }
        assert_eq!(a.sync_checksum(), b.sync_checksum());
        b.perturb();
        assert_ne!(a.sync_checksum(), b.sync_checksum());
    }

    #[test]
    fn scratch_dir_is_empty() {
        let dir = scratch_dir("utils_self_test");
        std::fs::write(dir.join("x"), "x").unwrap();
        let again = scratch_dir("utils_self_test");
        assert_eq!(std::fs::read_dir(&again).unwrap().count(), 0);
    }
}
