//! Command vocabulary.
//!
//! Outbound: the load script the dispatcher hands to the control channel.
//! Its token names are a contract with the feed unit's macros and must not
//! change.  Inbound: console commands the host forwards to us.

use core::fmt::{self, Write};

use crate::config::AutoloadConfig;
use crate::sensors::Lane;
use crate::sensors::downstream::Occupancy;

/// Macro that pulls filament from a pregate into the hub.
pub const LOAD_ACTION: &str = "SP_LOAD_HUB";
/// Parameter carrying the [`LoadMode`].
pub const MODE_PARAM: &str = "NO_SENSOR_CHECK";
/// Parameter carrying the lane index.
pub const LANE_PARAM: &str = "LANE";

/// Capacity of a rendered script.  The longest possible script
/// (`SP_LOAD_HUB NO_SENSOR_CHECK=1 LANE=255`) is 37 bytes.
pub const SCRIPT_CAP: usize = 48;

/// A rendered, opaque command script.
pub type Script = heapless::String<SCRIPT_CAP>;

/// How the load macro should treat the junction past the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoadMode {
    /// Junction free: load up to the gate, then park.
    GateFree = 0,
    /// Junction occupied: only pull filament a short way in.
    GateOccupied = 1,
}

impl From<Occupancy> for LoadMode {
    fn from(occupancy: Occupancy) -> Self {
        match occupancy {
            Occupancy::Free => Self::GateFree,
            Occupancy::Occupied => Self::GateOccupied,
        }
    }
}

/// One load request for one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadCommand {
    pub lane: Lane,
    pub mode: LoadMode,
}

impl LoadCommand {
    pub fn new(lane: Lane, mode: LoadMode) -> Self {
        Self { lane, mode }
    }

    /// Render to the wire form, e.g. `SP_LOAD_HUB NO_SENSOR_CHECK=0 LANE=1`.
    pub fn script(&self) -> Script {
        let mut s = Script::new();
        // Cannot overflow: see SCRIPT_CAP.
        let _ = write!(s, "{self}");
        s
    }
}

impl fmt::Display for LoadCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}={} {}={}",
            LOAD_ACTION, MODE_PARAM, self.mode as u8, LANE_PARAM, self.lane
        )
    }
}

/// Commands the host console can deliver to the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// The feed unit finished homing; start monitoring.
    HomeDone,
}

impl HostCommand {
    /// Recognise a console line.  Matching is case-insensitive on the
    /// command word; trailing parameters are ignored.
    pub fn parse(line: &str, config: &AutoloadConfig) -> Option<Self> {
        let word = line.split_whitespace().next()?;
        word.eq_ignore_ascii_case(&config.ready_command)
            .then_some(Self::HomeDone)
    }
}
