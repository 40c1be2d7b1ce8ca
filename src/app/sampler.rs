//! Sampling loop: the free-running half of the monitor.
//!
//! ```text
//!  ReadinessGate ──▶ MachineStateProbe ──▶ EdgeDetector ──▶ CommandQueue
//!   (parked until     (busy ⇒ skip tick)    (rising edges)   (arms the
//!    ready)                                                   dispatcher)
//! ```
//!
//! [`Sampler::tick`] is one pass; [`Sampler::run`] parks until the gate
//! opens and then ticks forever, backing off after any faulted pass.

use core::time::Duration;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use log::{debug, error, info, warn};

use super::commands::{LoadCommand, LoadMode};
use super::events::AutoloadEvent;
use super::ports::{EventSink, PresenceSensor, StatusSource};
use crate::config::AutoloadConfig;
use crate::diagnostics::AutoloadStats;
use crate::dispatch::CommandQueue;
use crate::error::{Error, Result};
use crate::machine::{MachineState, MachineStateProbe};
use crate::readiness::ReadinessGate;
use crate::sensors::downstream::DownstreamSensor;
use crate::sensors::{EdgeDetector, Lane, SensorSnapshot};

/// What one [`Sampler::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Gate still closed; nothing was read.
    NotReady,
    /// Machine not quiet enough to look at sensors.
    Skipped(MachineState),
    /// Sensors were polled.
    Polled { edges: usize, queued: usize },
}

pub struct Sampler<S, T> {
    gate: Arc<ReadinessGate>,
    probe: MachineStateProbe<T>,
    lanes: EdgeDetector<S>,
    downstream: DownstreamSensor<S>,
    queue: Arc<CommandQueue>,
    stats: Arc<AutoloadStats>,
    poll_interval: Duration,
    fault_backoff: Duration,
}

impl<S: PresenceSensor, T: StatusSource> Sampler<S, T> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gate: Arc<ReadinessGate>,
        probe: MachineStateProbe<T>,
        lanes: EdgeDetector<S>,
        downstream: DownstreamSensor<S>,
        queue: Arc<CommandQueue>,
        stats: Arc<AutoloadStats>,
        config: &AutoloadConfig,
    ) -> Self {
        Self {
            gate,
            probe,
            lanes,
            downstream,
            queue,
            stats,
            poll_interval: config.poll_interval(),
            fault_backoff: config.fault_backoff(),
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One pass: gate → machine state → sensors → queue.
    ///
    /// Every rising edge is enqueued before this returns, so the next pass
    /// never sees the same insertion twice.  A failed enqueue still lets
    /// the remaining edges through; the first error is reported afterwards.
    pub fn tick(&mut self, sink: &mut impl EventSink) -> Result<TickOutcome> {
        if !self.gate.is_ready() {
            return Ok(TickOutcome::NotReady);
        }
        self.stats.record_tick();

        let state = self.probe.current_state();
        if !state.allows_detection() {
            self.stats.record_skipped_tick();
            return Ok(TickOutcome::Skipped(state));
        }

        let polled = self.lanes.poll(sink);
        if polled.faults > 0 {
            self.stats.record_sensor_faults(polled.faults);
        }

        let mut queued = 0;
        let mut first_error = None;
        for &lane in &polled.edges {
            self.stats.record_rising_edge();
            match self.enqueue_load(lane, sink) {
                Ok(()) => queued += 1,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(TickOutcome::Polled {
                edges: polled.edges.len(),
                queued,
            }),
        }
    }

    /// Build the load script for `lane` and append it to the queue.
    ///
    /// Refuses outright while the gate is closed.
    pub fn enqueue_load(&mut self, lane: Lane, sink: &mut impl EventSink) -> Result<()> {
        if !self.gate.is_ready() {
            info!("Sampler: ignored lane {}, feed unit not ready yet", lane);
            return Err(Error::NotReady);
        }

        let mode = LoadMode::from(self.downstream.occupancy());
        let script = LoadCommand::new(lane, mode).script();

        info!("Sampler: queuing command for lane {}: {}", lane, script);
        match self.queue.push(script.clone()) {
            Ok(armed) => {
                if armed {
                    debug!("Sampler: dispatcher armed");
                }
                self.stats.record_queued();
                sink.emit(&AutoloadEvent::LoadQueued { lane, script });
                Ok(())
            }
            Err(e) => {
                warn!("Sampler: lane {} command dropped: {}", lane, e);
                self.stats.record_dropped();
                sink.emit(&AutoloadEvent::LoadDropped { lane, script });
                Err(e.into())
            }
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Sleep in `poll_interval` steps until the gate opens.  No sensor is
    /// read while waiting.
    pub fn wait_for_readiness(&self) {
        while !self.gate.is_ready() {
            std::thread::sleep(self.poll_interval);
        }
    }

    /// Park, then tick forever.
    ///
    /// An error or panic inside one tick is logged and followed by
    /// `fault_backoff`; the loop itself never ends.
    pub fn run(mut self, sink: &mut impl EventSink) -> ! {
        self.wait_for_readiness();
        info!("Sampler: main loop started (feed unit ready)");

        loop {
            let delay = match catch_unwind(AssertUnwindSafe(|| self.tick(sink))) {
                Ok(Ok(outcome)) => {
                    if let TickOutcome::Skipped(state) = outcome {
                        debug!("Sampler: machine {}, skipping sensors", state);
                    }
                    self.poll_interval
                }
                Ok(Err(e)) => {
                    error!("Sampler: error in loop: {}", e);
                    self.stats.record_loop_fault();
                    self.fault_backoff
                }
                Err(_) => {
                    error!("Sampler: loop iteration panicked");
                    self.stats.record_loop_fault();
                    self.fault_backoff
                }
            };
            std::thread::sleep(delay);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn snapshot(&self) -> SensorSnapshot {
        self.lanes.snapshot()
    }

    pub fn queue(&self) -> &Arc<CommandQueue> {
        &self.queue
    }
}
