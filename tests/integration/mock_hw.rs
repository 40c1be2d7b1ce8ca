//! Mock host adapters for integration tests.
//!
//! Every mock is a cheap handle onto shared state, so a test can keep one
//! copy for scripting and hand clones to the sampler, the dispatcher or a
//! background thread.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use pregate::app::events::AutoloadEvent;
use pregate::app::ports::{
    ControlChannel, EventSink, PresenceSensor, SensorRegistry, StatusSource,
};
use pregate::error::{ExecError, ProbeError, SensorError};
use pregate::machine::{LegacyStatus, PrintStats};

// ── Sensors ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Reading {
    Value(bool),
    Fail,
}

#[derive(Debug, Clone)]
pub struct MockSensor {
    reading: Arc<Mutex<Reading>>,
    pub reads: Arc<Mutex<usize>>,
}

impl PresenceSensor for MockSensor {
    fn read_presence(&mut self) -> Result<bool, SensorError> {
        *self.reads.lock().unwrap() += 1;
        match *self.reading.lock().unwrap() {
            Reading::Value(v) => Ok(v),
            Reading::Fail => Err(SensorError::ReadFailed),
        }
    }
}

/// Named switches.  Names never registered fail lookup.
#[derive(Debug, Clone, Default)]
pub struct MockRegistry {
    sensors: Arc<Mutex<HashMap<String, MockSensor>>>,
}

#[allow(dead_code)]
impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with an initial value.
    pub fn with(self, name: &str, present: bool) -> Self {
        self.sensors.lock().unwrap().insert(
            name.to_string(),
            MockSensor {
                reading: Arc::new(Mutex::new(Reading::Value(present))),
                reads: Arc::new(Mutex::new(0)),
            },
        );
        self
    }

    /// Lanes `mmu_pregate_0..` with the given values, plus a downstream
    /// `sp_sensor_runout` reading `false`.
    pub fn lanes(values: &[bool]) -> Self {
        values
            .iter()
            .enumerate()
            .fold(Self::new(), |r, (i, v)| r.with(&format!("mmu_pregate_{i}"), *v))
            .with("sp_sensor_runout", false)
    }

    pub fn set(&self, name: &str, present: bool) {
        *self.sensor(name).reading.lock().unwrap() = Reading::Value(present);
    }

    pub fn fail(&self, name: &str) {
        *self.sensor(name).reading.lock().unwrap() = Reading::Fail;
    }

    pub fn reads(&self, name: &str) -> usize {
        *self.sensor(name).reads.lock().unwrap()
    }

    fn sensor(&self, name: &str) -> MockSensor {
        self.sensors.lock().unwrap()[name].clone()
    }
}

impl SensorRegistry for MockRegistry {
    type Sensor = MockSensor;

    fn lookup(&mut self, name: &str) -> Result<MockSensor, SensorError> {
        self.sensors
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or(SensorError::NotFound)
    }
}

// ── Machine status ────────────────────────────────────────────

#[derive(Debug, Clone)]
struct StatusState {
    primary: Result<PrintStats, ProbeError>,
    legacy: Result<LegacyStatus, ProbeError>,
}

#[derive(Debug, Clone)]
pub struct MockStatus {
    state: Arc<Mutex<StatusState>>,
    panic_next: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockStatus {
    pub fn new(tag: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(StatusState {
                primary: Ok(PrintStats {
                    state: Some(tag.to_string()),
                }),
                legacy: Err(ProbeError::Unavailable),
            })),
            panic_next: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The next `print_stats` call panics.
    pub fn panic_once(&self) {
        self.panic_next.store(true, Ordering::SeqCst);
    }

    pub fn set(&self, tag: &str) {
        self.state.lock().unwrap().primary = Ok(PrintStats {
            state: Some(tag.to_string()),
        });
    }

    /// Primary path gone; only the legacy message answers.
    pub fn legacy_only(&self, legacy: LegacyStatus) {
        let mut s = self.state.lock().unwrap();
        s.primary = Err(ProbeError::Unavailable);
        s.legacy = Ok(legacy);
    }

    pub fn unavailable(&self) {
        let mut s = self.state.lock().unwrap();
        s.primary = Err(ProbeError::Unavailable);
        s.legacy = Err(ProbeError::Unavailable);
    }
}

impl StatusSource for MockStatus {
    fn print_stats(&self) -> Result<PrintStats, ProbeError> {
        if self.panic_next.swap(false, Ordering::SeqCst) {
            panic!("status source blew up");
        }
        self.state.lock().unwrap().primary.clone()
    }

    fn state_message(&self) -> Result<LegacyStatus, ProbeError> {
        self.state.lock().unwrap().legacy.clone()
    }
}

// ── Control channel ───────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MockChannel {
    executed: Arc<Mutex<Vec<String>>>,
    reject: Arc<Mutex<Vec<String>>>,
    panic_next: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next execution of exactly this script.
    pub fn reject_once(&self, script: &str) {
        self.reject.lock().unwrap().push(script.to_string());
    }

    /// The next execution panics after being recorded.
    pub fn panic_once(&self) {
        self.panic_next.store(true, Ordering::SeqCst);
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl ControlChannel for MockChannel {
    fn execute(&mut self, script: &str) -> Result<(), ExecError> {
        self.executed.lock().unwrap().push(script.to_string());
        if self.panic_next.swap(false, Ordering::SeqCst) {
            panic!("control channel blew up");
        }
        let mut reject = self.reject.lock().unwrap();
        if let Some(i) = reject.iter().position(|s| s == script) {
            reject.remove(i);
            return Err(ExecError::Rejected("Must home first".into()));
        }
        Ok(())
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<AutoloadEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AutoloadEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn queued_scripts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                AutoloadEvent::LoadQueued { script, .. } => Some(script.to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AutoloadEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
