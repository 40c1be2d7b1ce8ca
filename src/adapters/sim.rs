//! Simulated feed unit: sensors, machine status and control channel in
//! one shared in-memory model.
//!
//! Every clone of [`SimMachine`] sees the same state, so the console can
//! flip a switch while the sampler and dispatcher threads read it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::info;

use crate::app::ports::{ControlChannel, PresenceSensor, SensorRegistry, StatusSource};
use crate::config::AutoloadConfig;
use crate::error::{ExecError, ProbeError, SensorError};
use crate::machine::{LegacyStatus, PrintStats};

#[derive(Debug, Default)]
struct SimSwitch {
    present: AtomicBool,
    failing: AtomicBool,
}

#[derive(Debug, Default)]
struct SimShared {
    switches: Vec<(String, Arc<SimSwitch>)>,
    state: Mutex<String>,
    executed: Mutex<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct SimMachine {
    shared: Arc<SimShared>,
}

impl SimMachine {
    /// A machine with one switch per name, all empty, reporting `idle`.
    pub fn new<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let switches = names
            .into_iter()
            .map(|n| (n.into(), Arc::new(SimSwitch::default())))
            .collect();
        Self {
            shared: Arc::new(SimShared {
                switches,
                state: Mutex::new("idle".into()),
                executed: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Switches for every lane sensor plus the downstream sensor.
    pub fn from_config(config: &AutoloadConfig) -> Self {
        Self::new(
            config
                .lane_sensors
                .iter()
                .cloned()
                .chain(config.downstream_sensor.clone()),
        )
    }

    // ── Console controls ──────────────────────────────────────

    /// Returns `false` if no switch has that name.
    pub fn set_present(&self, name: &str, present: bool) -> bool {
        let Some(switch) = self.switch(name) else {
            return false;
        };
        switch.present.store(present, Ordering::SeqCst);
        true
    }

    /// Make every read of `name` fail until cleared.
    pub fn set_failing(&self, name: &str, failing: bool) -> bool {
        let Some(switch) = self.switch(name) else {
            return false;
        };
        switch.failing.store(failing, Ordering::SeqCst);
        true
    }

    pub fn set_state(&self, tag: &str) {
        *lock(&self.shared.state) = tag.to_string();
        info!("SIM   | machine state -> '{}'", tag);
    }

    pub fn state(&self) -> String {
        lock(&self.shared.state).clone()
    }

    /// Every script the control channel has received, in order.
    pub fn executed(&self) -> Vec<String> {
        lock(&self.shared.executed).clone()
    }

    fn switch(&self, name: &str) -> Option<&Arc<SimSwitch>> {
        self.shared
            .switches
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to one simulated switch.
#[derive(Debug, Clone)]
pub struct SimSensor {
    switch: Arc<SimSwitch>,
}

impl PresenceSensor for SimSensor {
    fn read_presence(&mut self) -> Result<bool, SensorError> {
        if self.switch.failing.load(Ordering::SeqCst) {
            return Err(SensorError::ReadFailed);
        }
        Ok(self.switch.present.load(Ordering::SeqCst))
    }
}

impl SensorRegistry for SimMachine {
    type Sensor = SimSensor;

    fn lookup(&mut self, name: &str) -> Result<SimSensor, SensorError> {
        self.switch(name)
            .map(|s| SimSensor { switch: s.clone() })
            .ok_or(SensorError::NotFound)
    }
}

impl StatusSource for SimMachine {
    fn print_stats(&self) -> Result<PrintStats, ProbeError> {
        Ok(PrintStats {
            state: Some(self.state()),
        })
    }

    fn state_message(&self) -> Result<LegacyStatus, ProbeError> {
        Ok(LegacyStatus::Text(self.state()))
    }
}

impl ControlChannel for SimMachine {
    fn execute(&mut self, script: &str) -> Result<(), ExecError> {
        info!("SIM   | exec '{}'", script);
        lock(&self.shared.executed).push(script.to_string());
        Ok(())
    }
}
