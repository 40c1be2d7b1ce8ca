//! Task runtime: one OS thread per logical task.
//!
//! The sampler is a plain blocking loop on its own thread.  The dispatcher
//! runs as a cooperative task on an `edge-executor` local executor, woken
//! by the queue's arm signal and re-armed with `async-io-mini` timers, so
//! it never blocks and never overlaps its own next activation.
//!
//! ```text
//!  ┌────────────────────────┐        ┌──────────────────────────────────────┐
//!  │  autoload-sampler      │        │  autoload-dispatch                   │
//!  │  Sampler::run (loop)   │  arm   │  futures_lite::block_on              │
//!  │  sleep(poll_interval)  │───────▶│  └─ edge_executor::LocalExecutor     │
//!  └────────────────────────┘        │     └─ dispatch_loop                 │
//!                                    │        armed().await                 │
//!                                    │        activate · Timer::after(..)   │
//!                                    └──────────────────────────────────────┘
//! ```

use std::io;
use std::thread::JoinHandle;

use log::{debug, info};

use crate::app::ports::{ControlChannel, EventSink, PresenceSensor, StatusSource};
use crate::app::sampler::Sampler;
use crate::dispatch::{Activation, Dispatcher};

const SAMPLER_STACK_KB: usize = 64;
const DISPATCH_STACK_KB: usize = 64;

/// Spawn a named thread with an explicit stack size.
pub fn spawn_named(
    name: &str,
    stack_kb: usize,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    info!("Spawning '{}' (stack={}KB)", name, stack_kb);
    std::thread::Builder::new()
        .name(name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
}

/// Start the sampler on its own thread.  The thread never exits.
pub fn spawn_sampler<S, T, E>(sampler: Sampler<S, T>, mut sink: E) -> io::Result<JoinHandle<()>>
where
    S: PresenceSensor + 'static,
    T: StatusSource + 'static,
    E: EventSink + Send + 'static,
{
    spawn_named("autoload-sampler", SAMPLER_STACK_KB, move || {
        sampler.run(&mut sink)
    })
}

/// Start the dispatcher task on its own executor thread.
pub fn spawn_dispatcher<T, C, E>(
    dispatcher: Dispatcher<T>,
    channel: C,
    sink: E,
) -> io::Result<JoinHandle<()>>
where
    T: StatusSource + 'static,
    C: ControlChannel + Send + 'static,
    E: EventSink + Send + 'static,
{
    spawn_named("autoload-dispatch", DISPATCH_STACK_KB, move || {
        run_dispatcher(dispatcher, channel, sink);
    })
}

fn run_dispatcher<T, C, E>(dispatcher: Dispatcher<T>, channel: C, sink: E)
where
    T: StatusSource,
    C: ControlChannel,
    E: EventSink,
{
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
    executor
        .spawn(dispatch_loop(dispatcher, channel, sink))
        .detach();

    info!("Dispatch task started (reactor-driven)");
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
}

/// Wait for the queue to arm the dispatcher, then run activations until
/// the chain finishes.  Repeats forever.
pub async fn dispatch_loop<T, C, E>(dispatcher: Dispatcher<T>, mut channel: C, mut sink: E)
where
    T: StatusSource,
    C: ControlChannel,
    E: EventSink,
{
    loop {
        dispatcher.queue().armed().await;
        debug!("Dispatcher: armed with {} command(s)", dispatcher.queue().len());

        while let Activation::RearmAfter(delay) = dispatcher.activate(&mut channel, &mut sink) {
            async_io_mini::Timer::after(delay).await;
        }
    }
}
