//! Machine state probe.
//!
//! The host reports its state through two paths of different vintage: a
//! structured `print_stats` object and an older state-message accessor whose
//! shape varies (bare string or tuple).  Both are normalised here into one
//! [`MachineState`]; nothing downstream looks at raw strings.
//!
//! | Tag        | Detection | Dispatch |
//! |------------|-----------|----------|
//! | `idle`     | yes       | yes      |
//! | `ready`    | yes       | yes      |
//! | `standby`  | yes       | yes      |
//! | `paused`   | yes       | no       |
//! | `busy`     | no        | no       |
//! | `unknown`  | no        | no       |

use core::fmt;

use log::debug;

use crate::app::ports::StatusSource;

/// Structured job status from the preferred read path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintStats {
    /// Raw `state` field, if the object carried one.
    pub state: Option<String>,
}

/// Legacy state message, in whichever shape the host returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyStatus {
    Text(String),
    /// Tuple-like answer; the first element carries the state.
    Tuple(Vec<String>),
}

impl LegacyStatus {
    /// The element that carries the state, if any.
    pub fn primary(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Tuple(items) => items.first().map(String::as_str),
        }
    }
}

/// Normalised machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachineState {
    Idle,
    Ready,
    Standby,
    Paused,
    /// Any recognisable state other than the four quiet ones (printing,
    /// complete, error, ...).
    Busy,
    /// Nothing meaningful could be read.
    Unknown,
}

impl MachineState {
    /// Normalise a raw state tag.  Case and surrounding whitespace are
    /// ignored; an empty tag is `Unknown`, any other unrecognised tag is `Busy`.
    pub fn from_tag(raw: &str) -> Self {
        let tag = raw.trim().to_lowercase();
        match tag.as_str() {
            "" => Self::Unknown,
            "idle" => Self::Idle,
            "ready" => Self::Ready,
            "standby" => Self::Standby,
            "paused" => Self::Paused,
            "unknown" => Self::Unknown,
            _ => Self::Busy,
        }
    }

    /// States in which the sampler may poll sensors and enqueue loads.
    pub fn allows_detection(self) -> bool {
        matches!(self, Self::Idle | Self::Ready | Self::Standby | Self::Paused)
    }

    /// States in which the dispatcher may execute a queued load.
    /// Stricter than detection: a paused job must not have filament moved.
    pub fn allows_dispatch(self) -> bool {
        matches!(self, Self::Idle | Self::Ready | Self::Standby)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Ready => "ready",
            Self::Standby => "standby",
            Self::Paused => "paused",
            Self::Busy => "busy",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Queries a [`StatusSource`] and never fails: every error path ends in
/// [`MachineState::Unknown`].
#[derive(Debug, Clone)]
pub struct MachineStateProbe<T> {
    source: T,
}

impl<T: StatusSource> MachineStateProbe<T> {
    pub fn new(source: T) -> Self {
        Self { source }
    }

    pub fn current_state(&self) -> MachineState {
        match self.source.print_stats() {
            Ok(stats) => MachineState::from_tag(stats.state.as_deref().unwrap_or_default()),
            Err(primary) => match self.source.state_message() {
                Ok(legacy) => legacy
                    .primary()
                    .map_or(MachineState::Unknown, MachineState::from_tag),
                Err(fallback) => {
                    debug!("Probe: print_stats {}, state_message {}", primary, fallback);
                    MachineState::Unknown
                }
            },
        }
    }

    pub fn source(&self) -> &T {
        &self.source
    }
}
