//! Determinism verification integration tests.
//!
//! Each test: drive a mock simulation through a command script while a
//! `Recorder` writes the log to disk → read the file back → replay it
//! through a fresh twin simulation with a `Player` → compare the
//! commands both simulations executed and their final checksums.

use proptest::prelude::*;

use rewind_core::{
    ActionTag, CommandLog, CommandRecord, DispatchError, RecordedAction, SessionNotice,
    SimCommand, Simulation, TickId,
};
use rewind_replay::{
    decode, encode, log_hash, read_log_file, replay_to_end, DecodeMode, DesyncPolicy, Player,
    PlayerState, Recorder, ReplaySummary,
};
use rewind_test_utils::{
    init_tracing, random_log, random_requests, sample_header, scratch_dir, scripted_requests,
    MockSimulation, Script,
};

// ── Helpers ─────────────────────────────────────────────────────

const SEED: u32 = 0x0BAD_5EED;

fn fresh_sim() -> MockSimulation {
    MockSimulation::new(SEED).with_standard_units()
}

/// Play `script` live: record each request, then execute it.
fn record_session(sim: &mut MockSimulation, recorder: &mut Recorder, script: &Script) {
    for (tick, request) in script {
        sim.run_to(*tick);
        let record = recorder
            .record(&*sim, request)
            .unwrap()
            .cloned()
            .expect("request has an action");
        let cmd = SimCommand::from_record(&record).unwrap();
        sim.submit(cmd);
    }
}

fn replay(
    name: &str,
    script: &Script,
    policy: DesyncPolicy,
    perturb_at: Option<TickId>,
) -> (MockSimulation, MockSimulation, ReplaySummary, CommandLog) {
    init_tracing();
    let dir = scratch_dir(name);
    let mut live = fresh_sim();
    let mut recorder = Recorder::new(&dir, "log_of_rewind");
    record_session(&mut live, &mut recorder, script);
    let path = recorder.path().unwrap().to_path_buf();
    let recorded = recorder.log().clone();

    let (header, log) = read_log_file(&path, DecodeMode::Strict).unwrap();
    assert_eq!(log, recorded, "file and memory disagree");

    let mut twin = fresh_sim();
    twin.observer = true;
    let mut player = Player::new(policy);
    player.load(&header, log.clone(), &mut twin);
    let last = script.last().map_or(TickId(0), |(t, _)| *t);
    let summary = replay_to_end(&mut player, &mut twin, TickId(last.0 + 10), |s| {
        if Some(s.tick) == perturb_at {
            s.perturb();
        }
        s.step();
    });
    (live, twin, summary, log)
}

// ── Clean replays ───────────────────────────────────────────────

#[test]
fn scripted_session_replays_identically() {
    let script = scripted_requests();
    let (live, twin, summary, log) =
        replay("det_scripted", &script, DesyncPolicy::Lenient, None);

    assert_eq!(log.len(), 4);
    assert!(summary.is_clean(), "{summary:?}");
    assert_eq!(summary.dispatched, 4);
    assert_eq!(summary.last_tick, Some(TickId(20)));
    assert_eq!(twin.submitted, live.submitted);
    assert_eq!(twin.sync_checksum(), live.sync_checksum());
    assert_eq!(twin.notices, vec![SessionNotice::EndOfReplay]);
    assert!(!twin.observer);
}

#[test]
fn same_tick_commands_keep_log_order() {
    let script = scripted_requests();
    let (_, twin, _, _) = replay("det_order", &script, DesyncPolicy::Lenient, None);
    let at_ten: Vec<_> = twin
        .submitted
        .iter()
        .filter(|(t, _)| *t == TickId(10))
        .map(|(_, c)| c.tag())
        .collect();
    assert_eq!(at_ten, vec![ActionTag::Move, ActionTag::Attack]);
}

#[test]
fn random_sessions_replay_identically() {
    for seed in [1u64, 7, 42, 1234] {
        let script = random_requests(seed, 60);
        let name = format!("det_random_{seed}");
        let (live, twin, summary, log) = replay(&name, &script, DesyncPolicy::Strict, None);
        assert!(summary.is_clean(), "seed {seed}: {summary:?}");
        assert_eq!(summary.dispatched, log.len());
        assert_eq!(twin.submitted, live.submitted, "seed {seed}");
        assert_eq!(twin.sync_checksum(), live.sync_checksum(), "seed {seed}");
    }
}

#[test]
fn identical_scripts_produce_identical_logs() {
    let script = random_requests(99, 40);
    let (_, _, _, a) = replay("det_twice_a", &script, DesyncPolicy::Lenient, None);
    let (_, _, _, b) = replay("det_twice_b", &script, DesyncPolicy::Lenient, None);
    assert_eq!(log_hash(&a), log_hash(&b));
}

// ── Divergence ──────────────────────────────────────────────────

#[test]
fn perturbed_twin_is_flagged_once_and_keeps_going_when_lenient() {
    let script = scripted_requests();
    let (_, twin, summary, _) = replay(
        "det_lenient_desync",
        &script,
        DesyncPolicy::Lenient,
        Some(TickId(11)),
    );
    let desync = summary.first_desync.expect("desync detected");
    assert_eq!(desync.tick, TickId(12));
    assert_eq!(summary.final_state, PlayerState::Exhausted);
    assert_eq!(summary.dispatched, 4);
    let flagged = twin
        .notices
        .iter()
        .filter(|n| matches!(n, SessionNotice::OutOfSync { .. }))
        .count();
    assert_eq!(flagged, 1);
}

#[test]
fn perturbed_twin_halts_when_strict() {
    let script = scripted_requests();
    let (_, twin, summary, _) = replay(
        "det_strict_desync",
        &script,
        DesyncPolicy::Strict,
        Some(TickId(11)),
    );
    assert_eq!(summary.final_state, PlayerState::Desynced);
    assert_eq!(summary.dispatched, 2);
    assert_eq!(summary.last_tick, Some(TickId(12)));
    assert!(twin.submitted.iter().all(|(t, _)| *t == TickId(10)));
    assert!(!twin.notices.contains(&SessionNotice::EndOfReplay));
}

// ── Legacy and damaged logs ─────────────────────────────────────

#[test]
fn unknown_action_is_skipped_when_decoded_leniently() {
    let header = sample_header();
    let log = CommandLog::from_records(vec![
        CommandRecord::new(TickId(1), RecordedAction::Unrecognized("teleport".into())),
        CommandRecord::new(TickId(1), ActionTag::Chat).with_payload("still here"),
    ])
    .unwrap();
    let text = encode(&header, &log);
    assert!(decode(&text, DecodeMode::Strict).is_err());

    let (header, log) = decode(&text, DecodeMode::Lenient).unwrap();
    let mut sim = fresh_sim();
    sim.run_to(TickId(1));
    let mut player = Player::new(DesyncPolicy::Strict);
    player.load(&header, log, &mut sim);
    let report = player.advance(TickId(1), &mut sim);
    assert_eq!(report.dispatched.as_slice(), &[ActionTag::Chat]);
    assert_eq!(
        report.skipped[0].reason,
        DispatchError::UnknownAction {
            name: "teleport".into()
        }
    );
    assert!(report.finished);
}

#[test]
fn legacy_records_without_checksum_never_desync() {
    let header = sample_header();
    let log = CommandLog::from_records(vec![
        CommandRecord::new(TickId(0), ActionTag::Chat).with_payload("a"),
        CommandRecord::new(TickId(3), ActionTag::Chat).with_payload("b"),
    ])
    .unwrap();
    let mut sim = fresh_sim();
    sim.perturb();
    let mut player = Player::new(DesyncPolicy::Strict);
    player.load(&header, log, &mut sim);
    let summary = replay_to_end(&mut player, &mut sim, TickId(10), |s| s.step());
    assert!(summary.is_clean(), "{summary:?}");
}

// ── Codec properties ────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_logs_round_trip(seed in any::<u64>(), count in 0usize..40) {
        let header = sample_header();
        let log = random_log(seed, count);
        let (h, l) = decode(&encode(&header, &log), DecodeMode::Strict).unwrap();
        prop_assert_eq!(h, header);
        prop_assert_eq!(l, log);
    }

    #[test]
    fn decoded_ticks_never_decrease(seed in any::<u64>(), count in 0usize..40) {
        let log = random_log(seed, count);
        let (_, l) = decode(&encode(&sample_header(), &log), DecodeMode::Strict).unwrap();
        prop_assert!(l.records().windows(2).all(|w| w[0].tick <= w[1].tick));
    }
}
