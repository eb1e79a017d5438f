//! Reusable session fixtures.
//!
//! - [`sample_setup`] / [`sample_header`]: a two-seat skirmish.
//! - [`scripted_requests`]: a short hand-written command script.
//! - [`random_requests`] / [`random_log`]: seeded generators for
//!   property and determinism tests.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use rewind_core::{
    ActionTag, CommandLog, CommandRecord, CommandRequest, ReplayHeader, SeatId, SessionKind,
    SessionSetup, SlotId, TickId, TilePos, VersionTriple,
};

/// Entity types placed by
/// [`MockSimulation::with_standard_units`](crate::MockSimulation::with_standard_units),
/// indexed by slot.
pub const STANDARD_UNITS: [&str; 8] = [
    "unit-footman",
    "unit-footman",
    "unit-archer",
    "unit-peasant",
    "unit-knight",
    "unit-town-hall",
    "unit-barracks",
    "unit-grunt",
];

/// A command script: requests paired with the tick they are issued on.
pub type Script = Vec<(TickId, CommandRequest)>;

/// Two named seats on a small map.
pub fn sample_setup() -> SessionSetup {
    let mut setup = SessionSetup {
        kind: SessionKind::SingleSeat,
        local_seat: SeatId(0),
        map: "Twin Fords".into(),
        map_path: "maps/twin-fords.smp".into(),
        map_id: 0x5EED_CAFE,
        race: 1,
        faction: -1,
        engine: VersionTriple::new(5, 1, 0),
        network: VersionTriple::new(2, 0, 7),
        ..SessionSetup::default()
    };
    if let Ok(seat) = setup.seats.get_mut(SeatId(0)) {
        seat.name = "Ada".into();
        seat.seat_type = 5;
    }
    if let Ok(seat) = setup.seats.get_mut(SeatId(1)) {
        seat.name = "Grace".into();
        seat.ai_script = "ai-passive".into();
        seat.team = 1;
        seat.seat_type = 4;
    }
    setup.rules.resource = 2;
    setup.rules.tech_level = 1;
    setup.rules.max_tech_level = 3;
    setup
}

/// Header for [`sample_setup`] with a fixed date.
pub fn sample_header() -> ReplayHeader {
    ReplayHeader::from_setup(&sample_setup(), "Mon Oct 19 12:00:00 2026")
}

/// A short skirmish: two commands on tick 10, one each on 12 and 20.
pub fn scripted_requests() -> Script {
    vec![
        (
            TickId(10),
            CommandRequest::new(ActionTag::Move)
                .actor(SlotId(0))
                .position((5, 5))
                .flush(1),
        ),
        (
            TickId(10),
            CommandRequest::new(ActionTag::Attack)
                .actor(SlotId(2))
                .target(SlotId(7))
                .flush(1),
        ),
        (
            TickId(12),
            CommandRequest::new(ActionTag::Train)
                .actor(SlotId(6))
                .payload("unit-footman")
                .num(1),
        ),
        (
            TickId(20),
            CommandRequest::new(ActionTag::Chat).payload("gg [[wp]]"),
        ),
    ]
}

fn random_request(rng: &mut ChaCha8Rng) -> CommandRequest {
    let actor = SlotId(rng.gen_range(0..STANDARD_UNITS.len() as u32));
    let pos = TilePos::new(rng.gen_range(0..64), rng.gen_range(0..64));
    let flush = rng.gen_range(0..2);
    let actions = [
        ActionTag::Move,
        ActionTag::Attack,
        ActionTag::Patrol,
        ActionTag::Stop,
        ActionTag::Build,
        ActionTag::Train,
        ActionTag::Chat,
        ActionTag::Diplomacy,
    ];
    let action = *actions.choose(rng).unwrap_or(&ActionTag::Stop);
    let req = CommandRequest::new(action);
    match action {
        ActionTag::Move | ActionTag::Patrol => req.actor(actor).position(pos).flush(flush),
        ActionTag::Attack => req
            .actor(actor)
            .target(SlotId(rng.gen_range(0..STANDARD_UNITS.len() as u32)))
            .flush(flush),
        ActionTag::Build => req
            .actor(SlotId(3))
            .position(pos)
            .payload("unit-farm")
            .flush(flush),
        ActionTag::Train => req
            .actor(SlotId(6))
            .payload("unit-footman")
            .num(rng.gen_range(1..4)),
        ActionTag::Chat => req.payload(format!("message {}", rng.gen::<u16>())),
        ActionTag::Diplomacy => req.position((0, 1)).payload("allied"),
        _ => req.actor(actor),
    }
}

/// `count` valid requests spread over ticks starting at 1, several per
/// tick at times. Same seed, same script.
pub fn random_requests(seed: u64, count: usize) -> Script {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut tick = 1u64;
    (0..count)
        .map(|_| {
            tick += rng.gen_range(0..4);
            (TickId(tick), random_request(&mut rng))
        })
        .collect()
}

/// A log of `count` records with non-decreasing ticks and arbitrary
/// checksums, for codec tests. Actor type tags follow
/// [`STANDARD_UNITS`].
pub fn random_log(seed: u64, count: usize) -> CommandLog {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let records = random_requests(seed, count)
        .into_iter()
        .map(|(tick, req)| {
            let action = req.action.unwrap_or(ActionTag::Stop);
            let mut rec = CommandRecord::new(tick, action).with_flush(req.flush);
            if let Some(actor) = req.actor {
                rec = rec.with_actor(actor, STANDARD_UNITS[actor.0 as usize]);
            }
            rec.position = req.position;
            rec.target_slot = req.target;
            rec.payload = req.payload;
            rec.num = req.num;
            rec.with_checksum(rng.gen())
        })
        .collect();
    CommandLog::from_records(records).unwrap_or_default()
}
