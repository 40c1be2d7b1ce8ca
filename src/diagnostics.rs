//! Runtime diagnostics.
//!
//! Lock-free counters bumped by the sampler and the dispatcher, readable
//! from any thread, plus a panic hook that names the thread that died.

use core::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counters shared by both tasks.
#[derive(Debug, Default)]
pub struct AutoloadStats {
    ticks: AtomicU64,
    skipped_ticks: AtomicU64,
    sensor_faults: AtomicU64,
    rising_edges: AtomicU64,
    commands_queued: AtomicU64,
    commands_dropped: AtomicU64,
    commands_executed: AtomicU64,
    commands_failed: AtomicU64,
    loop_faults: AtomicU64,
    dispatch_faults: AtomicU64,
}

/// Point-in-time copy of [`AutoloadStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub ticks: u64,
    pub skipped_ticks: u64,
    pub sensor_faults: u64,
    pub rising_edges: u64,
    pub commands_queued: u64,
    pub commands_dropped: u64,
    pub commands_executed: u64,
    pub commands_failed: u64,
    pub loop_faults: u64,
    pub dispatch_faults: u64,
}

impl AutoloadStats {
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            skipped_ticks: AtomicU64::new(0),
            sensor_faults: AtomicU64::new(0),
            rising_edges: AtomicU64::new(0),
            commands_queued: AtomicU64::new(0),
            commands_dropped: AtomicU64::new(0),
            commands_executed: AtomicU64::new(0),
            commands_failed: AtomicU64::new(0),
            loop_faults: AtomicU64::new(0),
            dispatch_faults: AtomicU64::new(0),
        }
    }

    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_tick(&self) {
        self.skipped_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sensor_faults(&self, n: u8) {
        self.sensor_faults.fetch_add(n.into(), Ordering::Relaxed);
    }

    pub fn record_rising_edge(&self) {
        self.rising_edges.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_queued(&self) {
        self.commands_queued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.commands_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_executed(&self) {
        self.commands_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.commands_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_loop_fault(&self) {
        self.loop_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch_fault(&self) {
        self.dispatch_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            skipped_ticks: self.skipped_ticks.load(Ordering::Relaxed),
            sensor_faults: self.sensor_faults.load(Ordering::Relaxed),
            rising_edges: self.rising_edges.load(Ordering::Relaxed),
            commands_queued: self.commands_queued.load(Ordering::Relaxed),
            commands_dropped: self.commands_dropped.load(Ordering::Relaxed),
            commands_executed: self.commands_executed.load(Ordering::Relaxed),
            commands_failed: self.commands_failed.load(Ordering::Relaxed),
            loop_faults: self.loop_faults.load(Ordering::Relaxed),
            dispatch_faults: self.dispatch_faults.load(Ordering::Relaxed),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Panic hook
// ───────────────────────────────────────────────────────────────

/// Install a panic hook that logs the panic with its thread name, then
/// defers to the previously installed hook.
pub fn install_panic_handler() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };
        let thread = std::thread::current();
        let name = thread.name().unwrap_or("<unnamed>");
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();

        log::error!("PANIC in '{}': {} {}", name, reason, location);
        previous(info);
    }));
}
