//! Replay header: the session metadata needed to reproduce a match.

use crate::error::CoreError;
use crate::id::{SeatId, MAX_SEATS};

/// Per-seat descriptor copied from the live session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeatDescriptor {
    /// Display name; empty for unnamed seats.
    pub name: String,
    /// AI script identifier.
    pub ai_script: String,
    /// Race identifier.
    pub race: i32,
    /// Faction identifier, `-1` when unset.
    pub faction: i32,
    /// Team identifier.
    pub team: i32,
    /// Seat type (human, computer, nobody, ...), owned by the simulation.
    pub seat_type: i32,
}

impl Default for SeatDescriptor {
    fn default() -> Self {
        Self {
            name: String::new(),
            ai_script: String::new(),
            race: 0,
            faction: -1,
            team: 0,
            seat_type: 0,
        }
    }
}

/// Exactly [`MAX_SEATS`] seat descriptors with bounds-checked access.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Seats([SeatDescriptor; MAX_SEATS]);

impl Seats {
    /// Descriptor for `seat`, or `None` when out of range.
    pub fn get(&self, seat: SeatId) -> Option<&SeatDescriptor> {
        self.0.get(seat.index())
    }

    /// Mutable descriptor for `seat`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SeatOutOfRange`] when `seat >= MAX_SEATS`.
    pub fn get_mut(&mut self, seat: SeatId) -> Result<&mut SeatDescriptor, CoreError> {
        self.0
            .get_mut(seat.index())
            .ok_or(CoreError::SeatOutOfRange { seat })
    }

    /// Iterate over `(seat, descriptor)` pairs in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (SeatId, &SeatDescriptor)> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, s)| (SeatId(i as u32), s))
    }

    /// All descriptors as a slice.
    pub fn as_slice(&self) -> &[SeatDescriptor] {
        &self.0
    }
}

impl TryFrom<Vec<SeatDescriptor>> for Seats {
    type Error = Vec<SeatDescriptor>;

    /// Fails (returning the input) unless exactly [`MAX_SEATS`] entries are given.
    fn try_from(v: Vec<SeatDescriptor>) -> Result<Self, Self::Error> {
        <[SeatDescriptor; MAX_SEATS]>::try_from(v).map(Self)
    }
}

/// Whether the session had one seat or several networked seats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionKind {
    /// Single-player session.
    #[default]
    SingleSeat,
    /// Multi-player session.
    MultiSeat,
}

impl SessionKind {
    /// Integer written to the header's `Type` field.
    pub fn wire_code(self) -> i64 {
        match self {
            Self::SingleSeat => 1,
            Self::MultiSeat => 2,
        }
    }

    /// Parse the header's `Type` field.
    pub fn from_wire_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::SingleSeat),
            2 => Some(Self::MultiSeat),
            _ => None,
        }
    }
}

/// Game-rule toggles copied verbatim between the simulation's settings
/// and the header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleSettings {
    /// Starting resource level.
    pub resource: i32,
    /// Starting unit preset.
    pub num_units: i32,
    /// AI difficulty.
    pub difficulty: i32,
    /// Fog of war disabled.
    pub no_fow: bool,
    /// Underground (inside) map lighting.
    pub inside: bool,
    /// Map reveal mode.
    pub reveal_map: i32,
    /// Game type (melee, free-for-all, ...).
    pub game_type: i32,
    /// Number of opponents.
    pub opponents: i32,
    /// Resource richness of the map.
    pub map_richness: i32,
    /// Random outcomes disabled.
    pub no_randomness: bool,
    /// Day/night cycle disabled.
    pub no_time_of_day: bool,
    /// Starting tech level.
    pub tech_level: i32,
    /// Maximum reachable tech level.
    pub max_tech_level: i32,
}

/// A `major.minor.patch` version, recorded for diagnostics only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VersionTriple {
    /// Major version.
    pub major: i32,
    /// Minor version.
    pub minor: i32,
    /// Patch level.
    pub patch: i32,
}

impl VersionTriple {
    /// Construct a version triple.
    pub fn new(major: i32, minor: i32, patch: i32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Snapshot of the live session state a header is built from.
///
/// Also the value handed back to the simulation when a replay starts,
/// so it can restore the recorded starting conditions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSetup {
    /// Single or multi seat.
    pub kind: SessionKind,
    /// Seat whose perspective is recorded.
    pub local_seat: SeatId,
    /// Seat descriptors.
    pub seats: Seats,
    /// Map description.
    pub map: String,
    /// Map path.
    pub map_path: String,
    /// Map content checksum.
    pub map_id: u32,
    /// Local race selection.
    pub race: i32,
    /// Local faction selection, `-1` when unset.
    pub faction: i32,
    /// Rule toggles.
    pub rules: RuleSettings,
    /// Engine version of the running build.
    pub engine: VersionTriple,
    /// Network protocol version of the running build.
    pub network: VersionTriple,
}

/// Session metadata written at the start of every log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayHeader {
    /// Free-text comment (generator name).
    pub comment1: String,
    /// Free-text comment (homepage).
    pub comment2: String,
    /// Free-text comment.
    pub comment3: String,
    /// Human-readable recording date.
    pub date: String,
    /// Map description.
    pub map: String,
    /// Map path.
    pub map_path: String,
    /// Map content checksum.
    pub map_id: u32,
    /// Single or multi seat.
    pub kind: SessionKind,
    /// Local race selection.
    pub race: i32,
    /// Local faction selection.
    pub faction: i32,
    /// Seat whose perspective was recorded.
    pub local_seat: SeatId,
    /// Seat descriptors.
    pub seats: Seats,
    /// Rule toggles.
    pub rules: RuleSettings,
    /// Engine version at record time.
    pub engine: VersionTriple,
    /// Network protocol version at record time.
    pub network: VersionTriple,
}

impl Default for ReplayHeader {
    fn default() -> Self {
        Self {
            comment1: String::new(),
            comment2: String::new(),
            comment3: String::new(),
            date: String::new(),
            map: String::new(),
            map_path: String::new(),
            map_id: 0,
            kind: SessionKind::SingleSeat,
            race: 0,
            faction: -1,
            local_seat: SeatId(0),
            seats: Seats::default(),
            rules: RuleSettings::default(),
            engine: VersionTriple::default(),
            network: VersionTriple::default(),
        }
    }
}

impl ReplayHeader {
    /// Build a header from a live session snapshot.
    ///
    /// Comments are filled with the generator name; `date` is supplied by
    /// the caller so this crate stays clock-free.
    pub fn from_setup(setup: &SessionSetup, date: impl Into<String>) -> Self {
        Self {
            comment1: format!("Generated by rewind version {}", env!("CARGO_PKG_VERSION")),
            comment2: "Visit https://github.com/tachyon-beep/rewind for more information".into(),
            comment3: String::new(),
            date: date.into(),
            map: setup.map.clone(),
            map_path: setup.map_path.clone(),
            map_id: setup.map_id,
            kind: setup.kind,
            race: setup.race,
            faction: setup.faction,
            local_seat: setup.local_seat,
            seats: setup.seats.clone(),
            rules: setup.rules.clone(),
            engine: setup.engine,
            network: setup.network,
        }
    }

    /// The starting conditions this header describes.
    pub fn setup(&self) -> SessionSetup {
        SessionSetup {
            kind: self.kind,
            local_seat: self.local_seat,
            seats: self.seats.clone(),
            map: self.map.clone(),
            map_path: self.map_path.clone(),
            map_id: self.map_id,
            race: self.race,
            faction: self.faction,
            rules: self.rules.clone(),
            engine: self.engine,
            network: self.network,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_setup() -> SessionSetup {
        let mut setup = SessionSetup {
            kind: SessionKind::MultiSeat,
            local_seat: SeatId(1),
            map: "Two Rivers".into(),
            map_path: "maps/two-rivers.smp".into(),
            map_id: 0xBEEF,
            faction: 3,
            engine: VersionTriple::new(5, 1, 0),
            network: VersionTriple::new(2, 0, 7),
            ..SessionSetup::default()
        };
        setup.seats.get_mut(SeatId(0)).unwrap().name = "Ada".into();
        setup.seats.get_mut(SeatId(1)).unwrap().name = "Grace".into();
        setup.rules.no_fow = true;
        setup
    }

    #[test]
    fn header_from_setup_round_trips_setup() {
        let setup = sample_setup();
        let header = ReplayHeader::from_setup(&setup, "Mon Oct 19 12:00:00 2026");
        assert_eq!(header.setup(), setup);
        assert_eq!(header.date, "Mon Oct 19 12:00:00 2026");
        assert!(header.comment1.starts_with("Generated by rewind"));
    }

    #[test]
    fn seats_are_bounds_checked() {
        let mut seats = Seats::default();
        assert!(seats.get(SeatId(MAX_SEATS as u32 - 1)).is_some());
        assert!(seats.get(SeatId(MAX_SEATS as u32)).is_none());
        assert_eq!(
            seats.get_mut(SeatId(99)).unwrap_err(),
            CoreError::SeatOutOfRange { seat: SeatId(99) }
        );
    }

    #[test]
    fn seats_require_exact_count() {
        let short = vec![SeatDescriptor::default(); MAX_SEATS - 1];
        assert!(Seats::try_from(short).is_err());
        let exact = vec![SeatDescriptor::default(); MAX_SEATS];
        assert!(Seats::try_from(exact).is_ok());
    }

    #[test]
    fn session_kind_wire_codes() {
        for kind in [SessionKind::SingleSeat, SessionKind::MultiSeat] {
            assert_eq!(SessionKind::from_wire_code(kind.wire_code()), Some(kind));
        }
        assert_eq!(SessionKind::from_wire_code(0), None);
    }

    #[test]
    fn default_faction_is_unset() {
        assert_eq!(SeatDescriptor::default().faction, -1);
        assert_eq!(ReplayHeader::default().faction, -1);
    }
}
