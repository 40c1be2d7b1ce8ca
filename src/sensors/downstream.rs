//! Downstream junction sensor.
//!
//! Tells the load command whether the shared path past the hub already
//! holds filament.  Resolved once at startup; a missing sensor or a failed
//! read both count as "free", the conservative answer.

use log::{debug, info, warn};

use crate::app::ports::{PresenceSensor, SensorRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Free,
    Occupied,
}

pub struct DownstreamSensor<S> {
    sensor: Option<S>,
}

impl<S: PresenceSensor> DownstreamSensor<S> {
    pub fn resolve<R>(name: Option<&str>, registry: &mut R) -> Self
    where
        R: SensorRegistry<Sensor = S>,
    {
        let Some(name) = name else {
            info!("Downstream: no sensor configured, loads assume a free junction");
            return Self::absent();
        };
        match registry.lookup(name) {
            Ok(sensor) => Self::new(sensor),
            Err(e) => {
                warn!("Downstream: can't find sensor '{}': {}", name, e);
                Self::absent()
            }
        }
    }

    pub fn new(sensor: S) -> Self {
        Self {
            sensor: Some(sensor),
        }
    }

    pub fn absent() -> Self {
        Self { sensor: None }
    }

    pub fn occupancy(&mut self) -> Occupancy {
        let Some(sensor) = self.sensor.as_mut() else {
            return Occupancy::Free;
        };
        match sensor.read_presence() {
            Ok(true) => Occupancy::Occupied,
            Ok(false) => Occupancy::Free,
            Err(e) => {
                debug!("Downstream: read failed ({}), assuming free", e);
                Occupancy::Free
            }
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.sensor.is_some()
    }
}
