//! One-way readiness latch.
//!
//! The feed unit's homing macro announces completion once.  Until then the
//! sampler stays parked and nothing may be enqueued; after it, the latch
//! never resets.

use core::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct ReadinessGate {
    ready: AtomicBool,
}

impl ReadinessGate {
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
        }
    }

    /// Latch the gate open.  Returns `true` only for the call that actually
    /// flipped it, so callers can log the transition exactly once.
    pub fn signal_ready(&self) -> bool {
        !self.ready.swap(true, Ordering::AcqRel)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}
