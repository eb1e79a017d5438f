//! Cumulative per-session counters.
//!
//! [`SessionMetrics`] is updated by the
//! [`SessionController`](crate::SessionController) and the
//! [`LockstepDriver`](crate::LockstepDriver) and read back through their
//! `metrics()` accessors. Counters survive [`end()`] so a finished
//! session can still be inspected; [`reset()`] clears them.
//!
//! [`end()`]: crate::SessionController::end
//! [`reset()`]: SessionMetrics::reset

/// Cumulative counters for one controller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionMetrics {
    /// Records appended to the live log.
    pub records_written: u64,
    /// Commands submitted to the simulation by the replay stepper.
    pub commands_dispatched: u64,
    /// Records the replay stepper skipped.
    pub records_skipped: u64,
    /// Checksum mismatches reported by the replay stepper.
    pub desync_events: u64,
    /// Commands refused because the inbox was full.
    pub inbox_rejections: u64,
}

impl SessionMetrics {
    /// Zero every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
