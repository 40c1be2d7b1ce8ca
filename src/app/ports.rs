//! Port traits: the hexagonal boundary between the autoload core and the
//! host it runs inside.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Sampler / Dispatcher (domain)
//! ```
//!
//! Driven adapters (sensors, machine status, control channel, event sinks,
//! config storage) implement these traits.  The domain consumes them via
//! generics, so the core never touches the host directly.

use std::sync::Arc;

use crate::config::AutoloadConfig;
use crate::error::{ExecError, ProbeError, SensorError};
use crate::machine::{LegacyStatus, PrintStats};

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapter: host sensors → domain)
// ───────────────────────────────────────────────────────────────

/// One binary filament switch.
pub trait PresenceSensor: Send {
    /// `true` when filament is present at the switch.
    fn read_presence(&mut self) -> Result<bool, SensorError>;
}

/// Name → sensor lookup, consulted once at startup.
///
/// A name that fails to resolve stays unresolved for the lifetime of the
/// process; nothing ever calls `lookup` again for it.
pub trait SensorRegistry {
    type Sensor: PresenceSensor;

    fn lookup(&mut self, name: &str) -> Result<Self::Sensor, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Machine status port
// ───────────────────────────────────────────────────────────────

/// The controlled machine's status, as two read paths of different age.
///
/// Shared between the sampler thread and the dispatcher thread, hence
/// `&self` and `Send + Sync`.
pub trait StatusSource: Send + Sync {
    /// Structured job status (preferred path).
    fn print_stats(&self) -> Result<PrintStats, ProbeError>;

    /// Legacy state message: a bare string or a `(message, category)`-like
    /// tuple depending on host version.
    fn state_message(&self) -> Result<LegacyStatus, ProbeError>;
}

impl<T: StatusSource + ?Sized> StatusSource for Arc<T> {
    fn print_stats(&self) -> Result<PrintStats, ProbeError> {
        (**self).print_stats()
    }

    fn state_message(&self) -> Result<LegacyStatus, ProbeError> {
        (**self).state_message()
    }
}

// ───────────────────────────────────────────────────────────────
// Control channel port (driven adapter: domain → device)
// ───────────────────────────────────────────────────────────────

/// Executes one opaque command script on the device.
pub trait ControlChannel {
    fn execute(&mut self, script: &str) -> Result<(), ExecError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AutoloadEvent`](super::events::AutoloadEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AutoloadEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists autoload configuration.
///
/// Implementations MUST validate before persisting and after loading;
/// out-of-range values are rejected with [`ConfigError::ValidationFailed`].
pub trait ConfigPort {
    /// Load configuration.  Returns [`AutoloadConfig::default()`] if no
    /// stored config exists.
    fn load(&self) -> Result<AutoloadConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &AutoloadConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
