//! Application core: autoload rules with no direct I/O.
//!
//! Sensors, the machine status, the host command channel and event output
//! are reached only through the **port traits** in [`ports`], so the
//! sampler and the dispatcher run unchanged against the simulator and the
//! test mocks.

pub mod commands;
pub mod events;
pub mod ports;
pub mod sampler;
pub mod service;
