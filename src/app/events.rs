//! Outbound application events.
//!
//! The sampler and dispatcher emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters decide what to do
//! with them: log, count, forward.

use super::commands::Script;
use crate::error::{ExecError, SensorError};
use crate::machine::MachineState;
use crate::sensors::Lane;

/// Structured events emitted by the autoload core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoloadEvent {
    /// The readiness signal arrived; monitoring starts.
    Ready,

    /// A configured lane sensor could not be used; the lane is inert.
    SensorMissing { lane: Lane, name: String },

    /// A lane sensor read failed this tick; its stored state is kept.
    SensorFault { lane: Lane, error: SensorError },

    /// A lane changed state (either direction).
    LaneChanged { lane: Lane, from: bool, to: bool },

    /// A load script was appended to the queue.
    LoadQueued { lane: Lane, script: Script },

    /// A load script was lost because the queue was full.
    LoadDropped { lane: Lane, script: Script },

    /// The dispatcher is holding the queue until the machine is quiet.
    DispatchDeferred { state: MachineState, pending: usize },

    /// The control channel accepted a script.
    CommandExecuted { script: Script },

    /// The control channel rejected a script; it is not retried.
    CommandFailed { script: Script, error: ExecError },
}
