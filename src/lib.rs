//! Pregate autoload monitor.
//!
//! Watches per-lane pregate filament switches on a multi-lane feed unit
//! and, on each insertion, queues a hub load command that a separate
//! dispatcher runs once the machine is quiet.
//!
//! The core ([`app`], [`sensors`], [`dispatch`], [`machine`]) talks to the
//! host only through the port traits in [`app::ports`]; [`adapters`] holds
//! the concrete implementations and [`runtime`] the task threads.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod machine;
pub mod readiness;
pub mod runtime;
pub mod sensors;

pub use app::commands::{HostCommand, LoadCommand, LoadMode, Script};
pub use app::events::AutoloadEvent;
pub use app::sampler::{Sampler, TickOutcome};
pub use app::service::{AutoloadService, TaskHandles};
pub use config::AutoloadConfig;
pub use dispatch::{Activation, CommandQueue, Dispatcher};
pub use error::{Error, Result};
pub use machine::{MachineState, MachineStateProbe};
pub use readiness::ReadinessGate;
pub use sensors::EdgeDetector;
