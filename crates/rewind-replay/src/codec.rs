//! Text encode/decode for the log format.
//!
//! A log is a header statement followed by one statement per record:
//!
//! ```text
//! --- -----------------------------------------
//! --- MODULE: replay list
//!
//! ReplayLog( {
//!   Comment1 = "...",
//!   ...
//!   Players = {
//!     { Name = "Ada", AIScript = "", Race = 0, Faction = -1, Team = 2, Type = 5 },
//!     ...
//!   },
//!   Engine = { 5, 1, 0 },
//!   Network = { 2, 0, 7 }
//! } )
//! Log( { GameCycle = 10, UnitNumber = 0, UnitIdent = "unit-footman", Action = "move", Flush = 1, PosX = 5, PosY = 5, SyncRandSeed = 1234 } )
//! ```
//!
//! Records omit unset fields. `Value` is written as a long string so
//! chat text and script input survive verbatim.

use std::str::FromStr;

use rewind_core::{
    ActionTag, CommandLog, CommandRecord, RecordedAction, ReplayHeader, SeatDescriptor, SeatId,
    Seats, SessionKind, SlotId, TickId, TilePos, VersionTriple, MAX_SEATS,
};

use crate::error::ReplayError;
use crate::table::{self, long_string, quote, Call, Entry, Table, Value};

/// Name of the header statement.
pub const HEADER_CALL: &str = "ReplayLog";
/// Name of a record statement.
pub const RECORD_CALL: &str = "Log";

/// How the decoder treats action names outside the vocabulary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecodeMode {
    /// An unknown action is a [`ReplayError::MalformedLog`].
    #[default]
    Strict,
    /// An unknown action is kept as [`RecordedAction::Unrecognized`] and
    /// reported when the record is stepped.
    Lenient,
}

// ── Encoding ────────────────────────────────────────────────────

/// Encode the header block, including the leading comment lines.
pub fn encode_header(header: &ReplayHeader) -> String {
    let mut out = String::new();
    out.push_str("\n--- -----------------------------------------\n");
    out.push_str("--- MODULE: replay list\n\n");
    out.push_str(&format!("{HEADER_CALL}( {{\n"));
    let field = |out: &mut String, key: &str, value: String| {
        out.push_str(&format!("  {key} = {value},\n"));
    };
    field(&mut out, "Comment1", quote(&header.comment1));
    field(&mut out, "Comment2", quote(&header.comment2));
    field(&mut out, "Comment3", quote(&header.comment3));
    field(&mut out, "Date", quote(&header.date));
    field(&mut out, "Map", quote(&header.map));
    field(&mut out, "MapPath", quote(&header.map_path));
    field(&mut out, "MapId", header.map_id.to_string());
    field(&mut out, "Type", header.kind.wire_code().to_string());
    field(&mut out, "Race", header.race.to_string());
    field(&mut out, "Faction", header.faction.to_string());
    field(&mut out, "LocalPlayer", header.local_seat.to_string());

    out.push_str("  Players = {\n");
    let seats = header.seats.as_slice();
    for (i, seat) in seats.iter().enumerate() {
        out.push_str("\t{");
        if !seat.name.is_empty() {
            out.push_str(&format!(" Name = {},", quote(&seat.name)));
        }
        out.push_str(&format!(
            " AIScript = {}, Race = {}, Faction = {}, Team = {}, Type = {} }}",
            quote(&seat.ai_script),
            seat.race,
            seat.faction,
            seat.team,
            seat.seat_type
        ));
        out.push_str(if i + 1 < seats.len() { ",\n" } else { "\n" });
    }
    out.push_str("  },\n");

    let rules = &header.rules;
    field(&mut out, "Resource", rules.resource.to_string());
    field(&mut out, "NumUnits", rules.num_units.to_string());
    field(&mut out, "Difficulty", rules.difficulty.to_string());
    field(&mut out, "NoFow", rules.no_fow.to_string());
    field(&mut out, "Inside", rules.inside.to_string());
    field(&mut out, "RevealMap", rules.reveal_map.to_string());
    field(&mut out, "GameType", rules.game_type.to_string());
    field(&mut out, "Opponents", rules.opponents.to_string());
    field(&mut out, "MapRichness", rules.map_richness.to_string());
    field(&mut out, "NoRandomness", rules.no_randomness.to_string());
    field(&mut out, "NoTimeOfDay", rules.no_time_of_day.to_string());
    field(&mut out, "TechLevel", rules.tech_level.to_string());
    field(&mut out, "MaxTechLevel", rules.max_tech_level.to_string());
    let triple = |v: &VersionTriple| format!("{{ {}, {}, {} }}", v.major, v.minor, v.patch);
    field(&mut out, "Engine", triple(&header.engine));
    out.push_str(&format!("  Network = {}\n", triple(&header.network)));
    out.push_str("} )\n");
    out
}

/// Encode one record as a single `Log( { ... } )` line.
///
/// Unset optional fields are omitted. A position of `(-1, -1)`, an
/// empty payload, and a `num` of `-1` are indistinguishable from unset
/// on the wire.
pub fn encode_record(rec: &CommandRecord) -> String {
    let mut out = format!("{RECORD_CALL}( {{ GameCycle = {}, ", rec.tick);
    if let Some(slot) = rec.actor_slot {
        out.push_str(&format!("UnitNumber = {slot}, "));
    }
    if !rec.actor_type_tag.is_empty() {
        out.push_str(&format!("UnitIdent = {}, ", quote(&rec.actor_type_tag)));
    }
    out.push_str(&format!("Action = {}, ", quote(rec.action.as_str())));
    out.push_str(&format!("Flush = {}, ", rec.flush));
    if let Some(pos) = rec.position.filter(|p| p.x != -1 || p.y != -1) {
        out.push_str(&format!("PosX = {}, PosY = {}, ", pos.x, pos.y));
    }
    if let Some(slot) = rec.target_slot {
        out.push_str(&format!("DestUnitNumber = {slot}, "));
    }
    if let Some(payload) = rec.payload.as_deref().filter(|p| !p.is_empty()) {
        out.push_str(&format!("Value = {}, ", long_string(payload)));
    }
    if let Some(num) = rec.num.filter(|&n| n != -1) {
        out.push_str(&format!("Num = {num}, "));
    }
    match rec.checksum {
        // Written signed so logs stay readable by 32-bit signed readers.
        Some(seed) => out.push_str(&format!("SyncRandSeed = {} }} )\n", seed as i32)),
        None => {
            // Drop the trailing ", " left by the last field.
            out.truncate(out.len() - 2);
            out.push_str(" } )\n");
        }
    }
    out
}

/// Encode a complete log: header block followed by every record.
pub fn encode(header: &ReplayHeader, log: &CommandLog) -> String {
    let mut out = encode_header(header);
    for rec in log {
        out.push_str(&encode_record(rec));
    }
    out
}

// ── Decoding ────────────────────────────────────────────────────

/// Decode a complete log.
///
/// # Errors
///
/// [`ReplayError::MalformedLog`] on a lexical or syntax error, an
/// unknown statement or key, a missing required field, a wrongly typed
/// or out-of-range value, a `Players` table without exactly
/// [`MAX_SEATS`] entries, a version triple without exactly three
/// entries, a record before the header, a second header, a decreasing
/// `GameCycle`, or (in [`DecodeMode::Strict`]) an unknown action.
pub fn decode(text: &str, mode: DecodeMode) -> Result<(ReplayHeader, CommandLog), ReplayError> {
    let mut header: Option<ReplayHeader> = None;
    let mut log = CommandLog::new();

    for call in table::parse(text)? {
        match call.name.as_str() {
            HEADER_CALL => {
                if header.is_some() {
                    return Err(ReplayError::malformed(call.line, "duplicate ReplayLog"));
                }
                header = Some(decode_header(&call)?);
            }
            RECORD_CALL => {
                if header.is_none() {
                    return Err(ReplayError::malformed(call.line, "Log before ReplayLog"));
                }
                let rec = decode_record(&call, mode)?;
                log.push(rec)
                    .map_err(|e| ReplayError::malformed(call.line, e.to_string()))?;
            }
            other => {
                return Err(ReplayError::malformed(
                    call.line,
                    format!("unknown statement '{other}'"),
                ))
            }
        }
    }

    let line = text.lines().count().max(1);
    let header = header.ok_or_else(|| ReplayError::malformed(line, "missing ReplayLog"))?;
    Ok((header, log))
}

fn reject_positional(t: &Table, what: &str) -> Result<(), ReplayError> {
    match t.positional.first() {
        Some(e) => Err(ReplayError::malformed(
            e.line,
            format!("unexpected positional entry in {what}"),
        )),
        None => Ok(()),
    }
}

fn int<T: TryFrom<i128>>(key: &str, e: &Entry) -> Result<T, ReplayError> {
    match &e.value {
        Value::Int(n) => T::try_from(*n).map_err(|_| out_of_range(key, *n, e.line)),
        other => Err(type_error(key, "integer", other, e.line)),
    }
}

fn out_of_range(key: &str, n: impl std::fmt::Display, line: usize) -> ReplayError {
    ReplayError::malformed(line, format!("{key} value {n} is out of range"))
}

fn string(key: &str, e: &Entry) -> Result<String, ReplayError> {
    match &e.value {
        Value::Str(s) => Ok(s.clone()),
        other => Err(type_error(key, "string", other, e.line)),
    }
}

fn boolean(key: &str, e: &Entry) -> Result<bool, ReplayError> {
    match &e.value {
        Value::Bool(b) => Ok(*b),
        other => Err(type_error(key, "boolean", other, e.line)),
    }
}

fn subtable<'a>(key: &str, e: &'a Entry) -> Result<&'a Table, ReplayError> {
    match &e.value {
        Value::Table(t) => Ok(t),
        other => Err(type_error(key, "table", other, e.line)),
    }
}

fn type_error(key: &str, want: &str, got: &Value, line: usize) -> ReplayError {
    ReplayError::malformed(
        line,
        format!("{key} must be a {want}, found {}", got.type_name()),
    )
}

fn unknown_key(key: &str, e: &Entry, what: &str) -> ReplayError {
    ReplayError::malformed(e.line, format!("unsupported key '{key}' in {what}"))
}

/// Optional slot: `-1` means unset.
fn slot(key: &str, e: &Entry) -> Result<Option<SlotId>, ReplayError> {
    let n: i64 = int(key, e)?;
    if n == -1 {
        return Ok(None);
    }
    u32::try_from(n)
        .map(|v| Some(SlotId(v)))
        .map_err(|_| out_of_range(key, n, e.line))
}

fn version(key: &str, e: &Entry) -> Result<VersionTriple, ReplayError> {
    let t = subtable(key, e)?;
    if let Some((k, v)) = t.keyed.first() {
        return Err(unknown_key(k, v, key));
    }
    let [major, minor, patch] = t.positional.as_slice() else {
        return Err(ReplayError::malformed(
            e.line,
            format!("{key} needs 3 entries, found {}", t.positional.len()),
        ));
    };
    Ok(VersionTriple::new(
        int(key, major)?,
        int(key, minor)?,
        int(key, patch)?,
    ))
}

fn decode_seat(e: &Entry) -> Result<SeatDescriptor, ReplayError> {
    let t = subtable("Players entry", e)?;
    reject_positional(t, "Players entry")?;
    let mut seat = SeatDescriptor::default();
    for (key, v) in &t.keyed {
        match key.as_str() {
            "Name" => seat.name = string(key, v)?,
            "AIScript" => seat.ai_script = string(key, v)?,
            "Race" => seat.race = int(key, v)?,
            "Faction" => seat.faction = int(key, v)?,
            "Team" => seat.team = int(key, v)?,
            "Type" => seat.seat_type = int(key, v)?,
            _ => return Err(unknown_key(key, v, "Players entry")),
        }
    }
    Ok(seat)
}

fn decode_seats(e: &Entry) -> Result<Seats, ReplayError> {
    let t = subtable("Players", e)?;
    if let Some((k, v)) = t.keyed.first() {
        return Err(unknown_key(k, v, "Players"));
    }
    if t.positional.len() != MAX_SEATS {
        return Err(ReplayError::malformed(
            e.line,
            format!(
                "Players needs {MAX_SEATS} entries, found {}",
                t.positional.len()
            ),
        ));
    }
    let seats = t
        .positional
        .iter()
        .map(decode_seat)
        .collect::<Result<Vec<_>, _>>()?;
    Seats::try_from(seats).map_err(|v| {
        ReplayError::malformed(
            e.line,
            format!("Players needs {MAX_SEATS} entries, found {}", v.len()),
        )
    })
}

fn decode_header(call: &Call) -> Result<ReplayHeader, ReplayError> {
    let t = &call.arg;
    reject_positional(t, HEADER_CALL)?;
    let mut h = ReplayHeader::default();
    let (mut kind, mut local, mut seats) = (None, None, None);

    for (key, v) in &t.keyed {
        let r = &mut h.rules;
        match key.as_str() {
            "Comment1" => h.comment1 = string(key, v)?,
            "Comment2" => h.comment2 = string(key, v)?,
            "Comment3" => h.comment3 = string(key, v)?,
            "Date" => h.date = string(key, v)?,
            "Map" => h.map = string(key, v)?,
            "MapPath" => h.map_path = string(key, v)?,
            "MapId" => h.map_id = int(key, v)?,
            "Type" => {
                let code: i64 = int(key, v)?;
                kind = Some(SessionKind::from_wire_code(code).ok_or_else(|| {
                    ReplayError::malformed(v.line, format!("unknown session type {code}"))
                })?);
            }
            "Race" => h.race = int(key, v)?,
            "Faction" => h.faction = int(key, v)?,
            "LocalPlayer" => {
                let seat: u32 = int(key, v)?;
                if seat as usize >= MAX_SEATS {
                    return Err(ReplayError::malformed(
                        v.line,
                        format!("LocalPlayer {seat} is out of range"),
                    ));
                }
                local = Some(SeatId(seat));
            }
            "Players" => seats = Some(decode_seats(v)?),
            "Resource" => r.resource = int(key, v)?,
            "NumUnits" => r.num_units = int(key, v)?,
            "Difficulty" => r.difficulty = int(key, v)?,
            "NoFow" => r.no_fow = boolean(key, v)?,
            "Inside" => r.inside = boolean(key, v)?,
            "RevealMap" => r.reveal_map = int(key, v)?,
            "GameType" => r.game_type = int(key, v)?,
            "Opponents" => r.opponents = int(key, v)?,
            "MapRichness" => r.map_richness = int(key, v)?,
            "NoRandomness" => r.no_randomness = boolean(key, v)?,
            "NoTimeOfDay" => r.no_time_of_day = boolean(key, v)?,
            "TechLevel" => r.tech_level = int(key, v)?,
            "MaxTechLevel" => r.max_tech_level = int(key, v)?,
            "Engine" => h.engine = version(key, v)?,
            "Network" => h.network = version(key, v)?,
            _ => return Err(unknown_key(key, v, HEADER_CALL)),
        }
    }

    let missing =
        |field: &str| ReplayError::malformed(call.line, format!("ReplayLog is missing {field}"));
    h.kind = kind.ok_or_else(|| missing("Type"))?;
    h.local_seat = local.ok_or_else(|| missing("LocalPlayer"))?;
    h.seats = seats.ok_or_else(|| missing("Players"))?;
    Ok(h)
}

fn decode_record(call: &Call, mode: DecodeMode) -> Result<CommandRecord, ReplayError> {
    let t = &call.arg;
    reject_positional(t, RECORD_CALL)?;
    let mut tick = None;
    let mut action = None;
    let (mut pos_x, mut pos_y) = (-1, -1);
    let mut rec = CommandRecord::new(TickId(0), ActionTag::Stop);

    for (key, v) in &t.keyed {
        match key.as_str() {
            "GameCycle" => tick = Some(TickId(int(key, v)?)),
            "UnitNumber" => rec.actor_slot = slot(key, v)?,
            "UnitIdent" => rec.actor_type_tag = string(key, v)?,
            "Action" => {
                let name = string(key, v)?;
                action = Some(match ActionTag::from_str(&name) {
                    Ok(tag) => RecordedAction::Known(tag),
                    Err(_) if mode == DecodeMode::Lenient => {
                        tracing::warn!(line = v.line, action = %name, "unrecognized action kept");
                        RecordedAction::Unrecognized(name)
                    }
                    Err(_) => {
                        return Err(ReplayError::malformed(
                            v.line,
                            format!("unknown action '{name}'"),
                        ))
                    }
                });
            }
            "Flush" => rec.flush = int(key, v)?,
            "PosX" => pos_x = int(key, v)?,
            "PosY" => pos_y = int(key, v)?,
            "DestUnitNumber" => rec.target_slot = slot(key, v)?,
            "Value" => rec.payload = Some(string(key, v)?).filter(|s| !s.is_empty()),
            "Num" => rec.num = Some(int(key, v)?).filter(|&n| n != -1),
            "SyncRandSeed" => {
                let n: i64 = int(key, v)?;
                // Older writers store the seed signed.
                let seed = if n < 0 {
                    i32::try_from(n).map(|s| s as u32).ok()
                } else {
                    u32::try_from(n).ok()
                };
                rec.checksum = Some(seed.ok_or_else(|| out_of_range(key, n, v.line))?);
            }
            _ => return Err(unknown_key(key, v, RECORD_CALL)),
        }
    }

    let missing =
        |field: &str| ReplayError::malformed(call.line, format!("Log is missing {field}"));
    rec.tick = tick.ok_or_else(|| missing("GameCycle"))?;
    rec.action = action.ok_or_else(|| missing("Action"))?;
    if pos_x != -1 || pos_y != -1 {
        rec.position = Some(TilePos::new(pos_x, pos_y));
    }
    Ok(rec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_core::RuleSettings;

    fn sample_header() -> ReplayHeader {
        let mut h = ReplayHeader {
            comment1: "Generated by rewind".into(),
            comment2: "Visit us".into(),
            comment3: "third \"quoted\" comment".into(),
            date: "Mon Oct 19 12:00:00 2026".into(),
            map: "Two Rivers".into(),
            map_path: "maps/two-rivers.smp".into(),
            map_id: 0xDEAD_BEEF,
            kind: SessionKind::MultiSeat,
            race: 1,
            faction: 4,
            local_seat: SeatId(1),
            rules: RuleSettings {
                no_fow: true,
                tech_level: 2,
                max_tech_level: 5,
                ..RuleSettings::default()
            },
            engine: VersionTriple::new(5, 1, 0),
            network: VersionTriple::new(2, 0, 7),
            ..ReplayHeader::default()
        };
        let seat = h.seats.get_mut(SeatId(0)).unwrap();
        seat.name = "Ada".into();
        seat.team = 2;
        seat.seat_type = 5;
        h.seats.get_mut(SeatId(1)).unwrap().name = "Grace".into();
        h
    }

    fn sample_log() -> CommandLog {
        CommandLog::from_records(vec![
            CommandRecord::new(TickId(10), ActionTag::Move)
                .with_actor(SlotId(0), "unit-footman")
                .with_flush(1)
                .with_position(TilePos::new(5, 5))
                .with_checksum(1234),
            CommandRecord::new(TickId(10), ActionTag::Attack)
                .with_actor(SlotId(0), "unit-footman")
                .with_target(SlotId(7))
                .with_checksum(0xFFFF_FFF0),
            CommandRecord::new(TickId(12), ActionTag::Chat)
                .with_payload("gg ]] \"wp\"")
                .with_checksum(99),
            CommandRecord::new(TickId(20), ActionTag::Quit).with_num(1),
        ])
        .unwrap()
    }

    #[test]
    fn full_log_round_trips() {
        let header = sample_header();
        let log = sample_log();
        let text = encode(&header, &log);
        let (h2, log2) = decode(&text, DecodeMode::Strict).unwrap();
        assert_eq!(h2, header);
        assert_eq!(log2, log);
    }

    #[test]
    fn record_line_omits_unset_fields() {
        let rec = CommandRecord::new(TickId(10), ActionTag::Move)
            .with_actor(SlotId(0), "unit-footman")
            .with_flush(1)
            .with_position(TilePos::new(5, 5))
            .with_checksum(1234);
        assert_eq!(
            encode_record(&rec),
            "Log( { GameCycle = 10, UnitNumber = 0, UnitIdent = \"unit-footman\", \
             Action = \"move\", Flush = 1, PosX = 5, PosY = 5, SyncRandSeed = 1234 } )\n"
        );
    }

    #[test]
    fn record_without_checksum_closes_cleanly() {
        let rec = CommandRecord::new(TickId(3), ActionTag::Stop);
        assert_eq!(
            encode_record(&rec),
            "Log( { GameCycle = 3, Action = \"stop\", Flush = 0 } )\n"
        );
    }

    #[test]
    fn checksum_is_written_signed_and_read_back_unsigned() {
        let rec = CommandRecord::new(TickId(1), ActionTag::Stop).with_checksum(0xFFFF_FFFF);
        let line = encode_record(&rec);
        assert!(line.contains("SyncRandSeed = -1 }"));
        let text = format!("{}{}", encode_header(&sample_header()), line);
        let (_, log) = decode(&text, DecodeMode::Strict).unwrap();
        assert_eq!(log.records()[0].checksum, Some(0xFFFF_FFFF));
    }

    #[test]
    fn header_starts_with_module_comment() {
        let text = encode_header(&sample_header());
        assert!(text.starts_with("\n--- -----"));
        assert!(text.contains("--- MODULE: replay list\n"));
        assert!(text.contains("  Network = { 2, 0, 7 }\n} )\n"));
    }

    #[test]
    fn partial_position_keeps_both_coordinates() {
        let text = format!(
            "{}Log( {{ GameCycle = 1, Action = \"quit\", PosX = 2 }} )\n",
            encode_header(&sample_header())
        );
        let (_, log) = decode(&text, DecodeMode::Strict).unwrap();
        assert_eq!(log.records()[0].position, Some(TilePos::new(2, -1)));
    }

    fn with_header(records: &str) -> String {
        format!("{}{records}", encode_header(&sample_header()))
    }

    fn malformed_line(text: &str) -> usize {
        match decode(text, DecodeMode::Strict) {
            Err(ReplayError::MalformedLog { line, .. }) => line,
            other => panic!("expected MalformedLog, got {other:?}"),
        }
    }

    #[test]
    fn unknown_record_key_is_malformed() {
        let text = with_header("Log( { GameCycle = 1, Action = \"stop\", Bogus = 1 } )\n");
        let header_lines = encode_header(&sample_header()).lines().count();
        assert_eq!(malformed_line(&text), header_lines + 1);
    }

    #[test]
    fn missing_required_record_fields_are_malformed() {
        malformed_line(&with_header("Log( { Action = \"stop\" } )\n"));
        malformed_line(&with_header("Log( { GameCycle = 4 } )\n"));
    }

    #[test]
    fn wrong_types_and_ranges_are_malformed() {
        malformed_line(&with_header("Log( { GameCycle = \"4\", Action = \"stop\" } )\n"));
        malformed_line(&with_header("Log( { GameCycle = -4, Action = \"stop\" } )\n"));
        malformed_line(&with_header(
            "Log( { GameCycle = 4, Action = \"stop\", SyncRandSeed = 4294967296 } )\n",
        ));
        malformed_line(&with_header(
            "Log( { GameCycle = 4, Action = \"stop\", UnitNumber = -2 } )\n",
        ));
    }

    #[test]
    fn largest_tick_survives_a_round_trip() {
        let mut log = CommandLog::new();
        log.push(CommandRecord::new(TickId(u64::MAX), ActionTag::Stop).with_checksum(7))
            .unwrap();
        let (_, back) = decode(&encode(&sample_header(), &log), DecodeMode::Strict).unwrap();
        assert_eq!(back, log);
    }

    #[test]
    fn decreasing_game_cycle_is_malformed() {
        let text = with_header(concat!(
            "Log( { GameCycle = 5, Action = \"stop\" } )\n",
            "Log( { GameCycle = 4, Action = \"stop\" } )\n",
        ));
        let header_lines = encode_header(&sample_header()).lines().count();
        assert_eq!(malformed_line(&text), header_lines + 2);
    }

    #[test]
    fn header_ordering_is_enforced() {
        malformed_line("Log( { GameCycle = 1, Action = \"stop\" } )\n");
        let twice = format!(
            "{}{}",
            encode_header(&sample_header()),
            encode_header(&sample_header())
        );
        malformed_line(&twice);
        malformed_line("");
    }

    #[test]
    fn player_and_version_arity_is_enforced() {
        let header = encode_header(&sample_header());
        // Comment out one unnamed seat line.
        let short_players = header.replacen("\t{ AIScript", "\t--{ AIScript", 1);
        malformed_line(&short_players);

        let bad_engine = header.replace("Engine = { 5, 1, 0 }", "Engine = { 5, 1 }");
        malformed_line(&bad_engine);
        let bad_network = header.replace("Network = { 2, 0, 7 }", "Network = { 2, 0, 7, 1 }");
        malformed_line(&bad_network);
    }

    #[test]
    fn header_requires_type_local_player_and_players() {
        let header = encode_header(&sample_header());
        malformed_line(&header.replace("  Type = 2,\n", ""));
        malformed_line(&header.replace("  LocalPlayer = 1,\n", ""));
        malformed_line(&header.replace("  Type = 2,\n", "  Type = 9,\n"));
    }

    #[test]
    fn unknown_action_depends_on_mode() {
        let text = with_header("Log( { GameCycle = 1, Action = \"teleport\" } )\n");
        malformed_line(&text);
        let (_, log) = decode(&text, DecodeMode::Lenient).unwrap();
        assert_eq!(
            log.records()[0].action,
            RecordedAction::Unrecognized("teleport".into())
        );
    }

    #[test]
    fn sentinel_values_read_as_unset() {
        let text = with_header(
            "Log( { GameCycle = 1, UnitNumber = -1, Action = \"stop\", PosX = -1, PosY = -1, \
             DestUnitNumber = -1, Value = [[]], Num = -1 } )\n",
        );
        let (_, log) = decode(&text, DecodeMode::Strict).unwrap();
        assert_eq!(log.records()[0], CommandRecord::new(TickId(1), ActionTag::Stop));
    }
}
