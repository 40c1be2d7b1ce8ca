//! Command queue shared by the sampler thread and the dispatcher task.
//!
//! Uses an `embassy-sync` bounded channel for the FIFO itself and an atomic
//! latch for "dispatcher active".  Whoever flips the latch false → true owns
//! the single dispatcher chain; the sampler does that through
//! [`CommandQueue::push`] and wakes the dispatcher through the arm signal.
//!
//! ```text
//! ┌──────────────┐  push + arm   ┌──────────────┐  signal  ┌──────────────┐
//! │   Sampler    │──────────────▶│ CommandQueue │─────────▶│  Dispatcher  │
//! │  (thread)    │               │ FIFO · latch │◀─────────│  (reactor)   │
//! └──────────────┘               └──────────────┘  pop/rel └──────────────┘
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use crate::app::commands::Script;
use crate::config::MAX_LANES;
use crate::error::QueueError;

/// Channel depth.  Every lane can be cycled four times during a long
/// busy spell before anything is dropped.
pub const QUEUE_DEPTH: usize = 4 * MAX_LANES;

pub struct CommandQueue {
    channel: Channel<CriticalSectionRawMutex, Script, QUEUE_DEPTH>,
    active: AtomicBool,
    arm: Signal<CriticalSectionRawMutex, ()>,
}

impl CommandQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            active: AtomicBool::new(false),
            arm: Signal::new(),
        }
    }

    /// Append a script.  Returns `Ok(true)` when this push armed an idle
    /// dispatcher, `Ok(false)` when a chain was already running.
    pub fn push(&self, script: Script) -> Result<bool, QueueError> {
        self.channel.try_send(script).map_err(|_| QueueError::Full)?;
        if self.claim() {
            self.arm.signal(());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Take the oldest script.  Dispatcher side only.
    pub fn pop(&self) -> Option<Script> {
        self.channel.try_receive().ok()
    }

    /// Drop the dispatcher latch.
    ///
    /// A push that lands between the dispatcher seeing an empty queue and
    /// this call would otherwise find the latch held and never arm anyone,
    /// so the queue is re-checked after the latch is released.  Returns
    /// `true` when the caller reclaimed the latch and must keep draining.
    pub fn release(&self) -> bool {
        self.active.store(false, Ordering::SeqCst);
        !self.channel.is_empty() && self.claim()
    }

    /// Wait until a push arms the dispatcher.
    pub async fn armed(&self) {
        self.arm.wait().await;
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    fn claim(&self) -> bool {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
