//! Sensor subsystem: the per-lane [`EdgeDetector`] and the downstream
//! junction sensor.
//!
//! The detector owns every resolved pregate switch and the
//! [`SensorSnapshot`] of what each lane last reported.  Each poll reads
//! every live lane and reports only insertions (0 → 1).

pub mod downstream;

use heapless::Vec;
use log::{info, warn};

use crate::app::events::AutoloadEvent;
use crate::app::ports::{EventSink, PresenceSensor, SensorRegistry};
use crate::config::MAX_LANES;

/// Lane index, `0..lane_count`.
pub type Lane = u8;

/// Last successfully observed presence per lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorSnapshot {
    present: [bool; MAX_LANES],
    lanes: u8,
}

impl SensorSnapshot {
    pub fn new(lanes: usize) -> Self {
        Self {
            present: [false; MAX_LANES],
            lanes: lanes.min(MAX_LANES) as u8,
        }
    }

    pub fn lane_count(&self) -> usize {
        self.lanes as usize
    }

    pub fn get(&self, lane: Lane) -> Option<bool> {
        (lane < self.lanes).then(|| self.present[lane as usize])
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.present[..self.lane_count()]
    }

    fn set(&mut self, lane: Lane, present: bool) {
        if lane < self.lanes {
            self.present[lane as usize] = present;
        }
    }
}

/// Result of one [`EdgeDetector::poll`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Polled {
    /// Lanes that went 0 → 1 this pass, in lane order.
    pub edges: Vec<Lane, MAX_LANES>,
    /// Lanes whose read failed this pass.
    pub faults: u8,
}

/// Samples every resolved lane and diffs against the snapshot.
pub struct EdgeDetector<S> {
    sensors: Vec<Option<S>, MAX_LANES>,
    snapshot: SensorSnapshot,
}

impl<S: PresenceSensor> EdgeDetector<S> {
    /// Resolve each named sensor once and seed the snapshot from a real
    /// read, so filament already loaded at startup never looks like an
    /// insertion.
    ///
    /// A name that does not resolve, or whose first read fails, leaves its
    /// lane permanently inert with a stored value of `false`.
    pub fn resolve<R>(names: &[String], registry: &mut R, sink: &mut impl EventSink) -> Self
    where
        R: SensorRegistry<Sensor = S>,
    {
        if names.len() > MAX_LANES {
            warn!(
                "EdgeDetector: {} sensors configured, only the first {} are monitored",
                names.len(),
                MAX_LANES
            );
        }

        let mut sensors = Vec::new();
        let mut snapshot = SensorSnapshot::new(names.len());

        for (i, name) in names.iter().take(MAX_LANES).enumerate() {
            let lane = i as Lane;
            let resolved = registry
                .lookup(name)
                .and_then(|mut sensor| sensor.read_presence().map(|v| (sensor, v)));

            let slot = match resolved {
                Ok((sensor, present)) => {
                    info!("EdgeDetector: initial state {}: {}", name, u8::from(present));
                    snapshot.set(lane, present);
                    Some(sensor)
                }
                Err(e) => {
                    warn!("EdgeDetector: can't use sensor '{}' for lane {}: {}", name, lane, e);
                    sink.emit(&AutoloadEvent::SensorMissing {
                        lane,
                        name: name.clone(),
                    });
                    None
                }
            };
            // Capacity is MAX_LANES and we take at most MAX_LANES names.
            let _ = sensors.push(slot);
        }

        Self { sensors, snapshot }
    }

    /// Read every live lane once.
    ///
    /// A failed read changes nothing for that lane.  A successful read that
    /// differs from the snapshot updates it; only 0 → 1 is reported.
    pub fn poll(&mut self, sink: &mut impl EventSink) -> Polled {
        let mut polled = Polled::default();

        for (i, slot) in self.sensors.iter_mut().enumerate() {
            let Some(sensor) = slot else {
                continue;
            };
            let lane = i as Lane;

            let present = match sensor.read_presence() {
                Ok(v) => v,
                Err(e) => {
                    info!("EdgeDetector: sensor read error lane {}: {}", lane, e);
                    sink.emit(&AutoloadEvent::SensorFault { lane, error: e });
                    polled.faults += 1;
                    continue;
                }
            };

            let previous = self.snapshot.present[i];
            if present == previous {
                continue;
            }

            sink.emit(&AutoloadEvent::LaneChanged {
                lane,
                from: previous,
                to: present,
            });
            self.snapshot.set(lane, present);

            if present {
                let _ = polled.edges.push(lane);
            }
        }

        polled
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        self.snapshot
    }

    pub fn lane_count(&self) -> usize {
        self.sensors.len()
    }

    /// Lanes with a live sensor behind them.
    pub fn resolved_count(&self) -> usize {
        self.sensors.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_resolved(&self, lane: Lane) -> bool {
        self.sensors
            .get(lane as usize)
            .is_some_and(Option::is_some)
    }
}
