//! Application service: wiring for the autoload core.
//!
//! [`AutoloadService`] owns the pieces both tasks share (readiness gate,
//! command queue, counters) and builds the [`Sampler`] and [`Dispatcher`]
//! from port implementations handed in by the caller.
//!
//! ```text
//!  SensorRegistry ──▶ ┌──────────────────────────┐ ──▶ ControlChannel
//!  StatusSource   ──▶ │      AutoloadService     │ ──▶ EventSink
//!  HostCommand    ──▶ │ Gate · Queue · Stats     │
//!                     └──────────────────────────┘
//! ```

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use log::info;

use super::commands::HostCommand;
use super::events::AutoloadEvent;
use super::ports::{ControlChannel, EventSink, SensorRegistry, StatusSource};
use super::sampler::Sampler;
use crate::config::AutoloadConfig;
use crate::diagnostics::{AutoloadStats, StatsSnapshot};
use crate::dispatch::{CommandQueue, Dispatcher};
use crate::machine::MachineStateProbe;
use crate::readiness::ReadinessGate;
use crate::runtime;
use crate::sensors::EdgeDetector;
use crate::sensors::downstream::DownstreamSensor;

/// Join handles for the two background tasks.
pub struct TaskHandles {
    pub sampler: JoinHandle<()>,
    pub dispatcher: JoinHandle<()>,
}

pub struct AutoloadService {
    config: AutoloadConfig,
    gate: Arc<ReadinessGate>,
    queue: Arc<CommandQueue>,
    stats: Arc<AutoloadStats>,
}

impl AutoloadService {
    pub fn new(config: AutoloadConfig) -> Self {
        Self {
            config,
            gate: Arc::new(ReadinessGate::new()),
            queue: Arc::new(CommandQueue::new()),
            stats: Arc::new(AutoloadStats::new()),
        }
    }

    // ── Construction ──────────────────────────────────────────

    /// Resolve every configured sensor once and build the sampler.
    pub fn build_sampler<R, T>(
        &self,
        registry: &mut R,
        status: T,
        sink: &mut impl EventSink,
    ) -> Sampler<R::Sensor, T>
    where
        R: SensorRegistry,
        T: StatusSource,
    {
        let lanes = EdgeDetector::resolve(&self.config.lane_sensors, registry, sink);
        let downstream = DownstreamSensor::resolve(self.config.downstream_sensor.as_deref(), registry);
        info!(
            "AutoloadService: {}/{} pregate sensors live, downstream {}",
            lanes.resolved_count(),
            lanes.lane_count(),
            if downstream.is_resolved() { "live" } else { "absent" }
        );

        Sampler::new(
            self.gate.clone(),
            MachineStateProbe::new(status),
            lanes,
            downstream,
            self.queue.clone(),
            self.stats.clone(),
            &self.config,
        )
    }

    pub fn build_dispatcher<T: StatusSource>(&self, status: T) -> Dispatcher<T> {
        Dispatcher::new(
            self.queue.clone(),
            MachineStateProbe::new(status),
            self.stats.clone(),
            &self.config,
        )
    }

    /// Resolve sensors and start both background tasks.
    pub fn start<R, T, C, E>(
        &self,
        registry: &mut R,
        status: T,
        channel: C,
        mut sink: E,
    ) -> io::Result<TaskHandles>
    where
        R: SensorRegistry,
        R::Sensor: 'static,
        T: StatusSource + Clone + 'static,
        C: ControlChannel + Send + 'static,
        E: EventSink + Clone + Send + 'static,
    {
        let sampler = self.build_sampler(registry, status.clone(), &mut sink);
        let dispatcher = self.build_dispatcher(status);

        let dispatcher = runtime::spawn_dispatcher(dispatcher, channel, sink.clone())?;
        let sampler = runtime::spawn_sampler(sampler, sink)?;
        info!("AutoloadService: background autoload started");

        Ok(TaskHandles {
            sampler,
            dispatcher,
        })
    }

    // ── Command handling ──────────────────────────────────────

    pub fn handle_command(&self, cmd: HostCommand, sink: &mut impl EventSink) {
        match cmd {
            HostCommand::HomeDone => {
                if self.gate.signal_ready() {
                    info!("AutoloadService: feed unit reported ready ({})", self.config.ready_command);
                    sink.emit(&AutoloadEvent::Ready);
                }
            }
        }
    }

    /// Feed a console line through [`HostCommand::parse`].  Returns `true`
    /// if the line was one of ours.
    pub fn handle_console_line(&self, line: &str, sink: &mut impl EventSink) -> bool {
        match HostCommand::parse(line, &self.config) {
            Some(cmd) => {
                self.handle_command(cmd, sink);
                true
            }
            None => false,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &AutoloadConfig {
        &self.config
    }

    pub fn gate(&self) -> &Arc<ReadinessGate> {
        &self.gate
    }

    pub fn queue(&self) -> &Arc<CommandQueue> {
        &self.queue
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}
