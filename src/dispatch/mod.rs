//! Queue dispatcher: drains the [`CommandQueue`] one script per activation.
//!
//! An activation never blocks.  It either asks to be run again after a
//! delay ([`Activation::RearmAfter`]) or declares the chain over
//! ([`Activation::Finished`]), in which case the next push re-arms it.
//!
//! ```text
//!            ┌─────────── queue empty ──────────────▶ release ─▶ Finished
//!  activate ─┤
//!            ├── machine not idle ──▶ RearmAfter(retry)   (queue untouched)
//!            │
//!            └── pop · execute ──┬── more queued ──▶ RearmAfter(drain)
//!                                └── drained ─────▶ release ─▶ Finished
//! ```
//!
//! A panic anywhere in an activation is caught, counted, and answered with
//! `RearmAfter(retry)`; the chain keeps its latch and carries on.

pub mod queue;

use core::time::Duration;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::app::events::AutoloadEvent;
use crate::app::ports::{ControlChannel, EventSink, StatusSource};
use crate::config::AutoloadConfig;
use crate::diagnostics::AutoloadStats;
use crate::machine::MachineStateProbe;

pub use queue::{CommandQueue, QUEUE_DEPTH};

/// What the dispatcher wants after one activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Run again after this delay.
    RearmAfter(Duration),
    /// Chain over; the latch is released.
    Finished,
}

pub struct Dispatcher<T> {
    queue: Arc<CommandQueue>,
    probe: MachineStateProbe<T>,
    stats: Arc<AutoloadStats>,
    retry: Duration,
    drain: Duration,
}

impl<T: StatusSource> Dispatcher<T> {
    pub fn new(
        queue: Arc<CommandQueue>,
        probe: MachineStateProbe<T>,
        stats: Arc<AutoloadStats>,
        config: &AutoloadConfig,
    ) -> Self {
        Self {
            queue,
            probe,
            stats,
            retry: config.dispatch_retry(),
            drain: config.dispatch_drain(),
        }
    }

    /// One activation.
    ///
    /// Executes at most one script.  An execution failure is logged and the
    /// script is discarded; it never stops the scripts behind it.  Neither
    /// does a panic: the script in flight is lost and the dispatcher comes
    /// back after `retry`.
    pub fn activate(
        &self,
        channel: &mut impl ControlChannel,
        sink: &mut impl EventSink,
    ) -> Activation {
        match catch_unwind(AssertUnwindSafe(|| self.step(channel, sink))) {
            Ok(activation) => activation,
            Err(_) => {
                error!("Dispatcher: activation panicked, retrying in {:?}", self.retry);
                self.stats.record_dispatch_fault();
                Activation::RearmAfter(self.retry)
            }
        }
    }

    pub fn queue(&self) -> &Arc<CommandQueue> {
        &self.queue
    }

    fn step(&self, channel: &mut impl ControlChannel, sink: &mut impl EventSink) -> Activation {
        if self.queue.is_empty() {
            return self.finish();
        }

        let state = self.probe.current_state();
        if !state.allows_dispatch() {
            debug!("Dispatcher: machine {}, holding {} command(s)", state, self.queue.len());
            sink.emit(&AutoloadEvent::DispatchDeferred {
                state,
                pending: self.queue.len(),
            });
            return Activation::RearmAfter(self.retry);
        }

        let Some(script) = self.queue.pop() else {
            return self.finish();
        };

        info!("Dispatcher: executing queued command: {}", script);
        match channel.execute(&script) {
            Ok(()) => {
                self.stats.record_executed();
                sink.emit(&AutoloadEvent::CommandExecuted { script });
            }
            Err(error) => {
                warn!("Dispatcher: command '{}' failed: {}", script, error);
                self.stats.record_failed();
                sink.emit(&AutoloadEvent::CommandFailed { script, error });
            }
        }

        if self.queue.is_empty() {
            self.finish()
        } else {
            Activation::RearmAfter(self.drain)
        }
    }

    fn finish(&self) -> Activation {
        if self.queue.release() {
            debug!("Dispatcher: command arrived during release, continuing");
            Activation::RearmAfter(self.drain)
        } else {
            Activation::Finished
        }
    }
}
