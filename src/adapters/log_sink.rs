//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each [`AutoloadEvent`] as one
//! tagged line through the `log` facade.  The tag column keeps the lane,
//! queue and execution streams easy to grep apart.

use log::{debug, info, warn};

use crate::app::events::AutoloadEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AutoloadEvent`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AutoloadEvent) {
        match event {
            AutoloadEvent::Ready => {
                info!("READY | feed unit homed, monitoring pregate sensors");
            }
            AutoloadEvent::SensorMissing { lane, name } => {
                warn!("LANE  | lane={} sensor='{}' unavailable, lane inert", lane, name);
            }
            AutoloadEvent::SensorFault { lane, error } => {
                warn!("LANE  | lane={} read failed: {}", lane, error);
            }
            AutoloadEvent::LaneChanged { lane, from, to } => {
                info!("LANE  | lane={} {} -> {}", lane, u8::from(*from), u8::from(*to));
            }
            AutoloadEvent::LoadQueued { lane, script } => {
                info!("QUEUE | lane={} queued '{}'", lane, script);
            }
            AutoloadEvent::LoadDropped { lane, script } => {
                warn!("QUEUE | lane={} dropped '{}' (queue full)", lane, script);
            }
            AutoloadEvent::DispatchDeferred { state, pending } => {
                debug!("QUEUE | machine {}, {} pending", state, pending);
            }
            AutoloadEvent::CommandExecuted { script } => {
                info!("EXEC  | ok '{}'", script);
            }
            AutoloadEvent::CommandFailed { script, error } => {
                warn!("EXEC  | failed '{}': {}", script, error);
            }
        }
    }
}
