//! Hashing utilities for log comparison.
//!
//! Uses FNV-1a over the encoded text of each record. Two logs hash
//! equal exactly when they encode to the same record lines, which makes
//! the hash a cheap check that a replayed session re-recorded the same
//! commands. These hashes are not cryptographically secure.

use rewind_core::{CommandLog, CommandRecord, ReplayHeader};

use crate::codec::{encode_header, encode_record};

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = (hash ^ b as u64).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Hash of a single record's encoded line.
pub fn record_hash(record: &CommandRecord) -> u64 {
    fnv1a_bytes(FNV_OFFSET, encode_record(record).as_bytes())
}

/// Hash of every record of a log, in order.
///
/// Returns `FNV_OFFSET` for an empty log.
pub fn log_hash(log: &CommandLog) -> u64 {
    log.iter().fold(FNV_OFFSET, |hash, record| {
        fnv1a_bytes(hash, encode_record(record).as_bytes())
    })
}

/// Hash of the encoded header block.
pub fn header_hash(header: &ReplayHeader) -> u64 {
    fnv1a_bytes(FNV_OFFSET, encode_header(header).as_bytes())
}
