//! Deterministic sync random stream.
//!
//! Every participant of a lockstep session draws gameplay randomness
//! from the same linear congruential generator, seeded identically.
//! Its 32-bit state is therefore a cheap divergence checksum: each
//! logged command stores the state at record time.

/// Multiplier of the sync LCG (`0x12345678 * 4 + 1`).
const MULTIPLIER: u32 = 0x48D1_59E1;

/// 32-bit linear congruential generator shared by all seats.
///
/// Deterministic across platforms: only wrapping `u32` arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SyncRand {
    seed: u32,
}

impl SyncRand {
    /// A generator with the given seed.
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Return the high half of the current state, then advance.
    pub fn next_u32(&mut self) -> u32 {
        let val = self.seed >> 16;
        self.seed = self.seed.wrapping_mul(MULTIPLIER).wrapping_add(1);
        val
    }

    /// A value in `0..bound`. Returns 0 for `bound == 0`.
    pub fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.next_u32() % bound
    }

    /// Current state, used as the sync checksum.
    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl Default for SyncRand {
    fn default() -> Self {
        Self::new(0x8765_4321)
    }
}
