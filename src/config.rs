//! Autoload configuration parameters
//!
//! All tunable parameters for the pregate monitor.  Values can be
//! overridden from a JSON file through [`ConfigPort`](crate::app::ports::ConfigPort).

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Hard upper bound on monitored lanes (stack-allocated lane tables).
pub const MAX_LANES: usize = 8;

/// Core autoload configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoloadConfig {
    // --- Sensors ---
    /// Pregate sensor names, one per lane, in lane order.
    pub lane_sensors: Vec<String>,
    /// Sensor watching the shared junction past the hub.  `None` means
    /// every load is issued as if the junction were free.
    pub downstream_sensor: Option<String>,

    // --- Timing ---
    /// Sampler tick period, also the readiness re-check period (milliseconds)
    pub poll_interval_ms: u32,
    /// Pause after a faulted sampler iteration (milliseconds)
    pub fault_backoff_ms: u32,
    /// Dispatcher re-check delay while the machine is not idle (milliseconds)
    pub dispatch_retry_ms: u32,
    /// Dispatcher delay between consecutive queued commands (milliseconds)
    pub dispatch_drain_ms: u32,

    // --- Host ---
    /// Console command the feed unit's homing macro issues when it is ready.
    pub ready_command: String,
}

impl Default for AutoloadConfig {
    fn default() -> Self {
        Self {
            lane_sensors: (0..4).map(|lane| format!("mmu_pregate_{lane}")).collect(),
            downstream_sensor: Some("sp_sensor_runout".into()),

            poll_interval_ms: 250,  // 4 Hz
            fault_backoff_ms: 1000,
            dispatch_retry_ms: 1000,
            dispatch_drain_ms: 100,

            ready_command: "SP_HOME_DONE".into(),
        }
    }
}

impl AutoloadConfig {
    /// Number of configured lanes.
    pub fn lane_count(&self) -> usize {
        self.lane_sensors.len()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.into())
    }

    pub fn fault_backoff(&self) -> Duration {
        Duration::from_millis(self.fault_backoff_ms.into())
    }

    pub fn dispatch_retry(&self) -> Duration {
        Duration::from_millis(self.dispatch_retry_ms.into())
    }

    pub fn dispatch_drain(&self) -> Duration {
        Duration::from_millis(self.dispatch_drain_ms.into())
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lane_sensors.is_empty() || self.lane_sensors.len() > MAX_LANES {
            return Err(ConfigError::ValidationFailed("lane_sensors must list 1–8 sensors"));
        }
        if self.lane_sensors.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed("lane_sensors entries must not be blank"));
        }
        for (i, name) in self.lane_sensors.iter().enumerate() {
            if self.lane_sensors[..i].contains(name) {
                return Err(ConfigError::ValidationFailed("lane_sensors entries must be unique"));
            }
        }
        if self
            .downstream_sensor
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(ConfigError::ValidationFailed("downstream_sensor must not be blank"));
        }
        if !(10..=5000).contains(&self.poll_interval_ms) {
            return Err(ConfigError::ValidationFailed("poll_interval_ms must be 10–5000"));
        }
        if !(100..=60_000).contains(&self.fault_backoff_ms) {
            return Err(ConfigError::ValidationFailed("fault_backoff_ms must be 100–60000"));
        }
        if !(100..=60_000).contains(&self.dispatch_retry_ms) {
            return Err(ConfigError::ValidationFailed("dispatch_retry_ms must be 100–60000"));
        }
        if self.dispatch_drain_ms == 0 || self.dispatch_drain_ms >= self.dispatch_retry_ms {
            return Err(ConfigError::ValidationFailed(
                "dispatch_drain_ms must be > 0 and < dispatch_retry_ms",
            ));
        }
        if self.ready_command.trim().is_empty()
            || self.ready_command.chars().any(char::is_whitespace)
        {
            return Err(ConfigError::ValidationFailed(
                "ready_command must be a single non-empty word",
            ));
        }
        Ok(())
    }
}
