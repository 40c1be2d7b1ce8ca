//! End-to-end tests with the real sampler thread and dispatcher executor.
//!
//! Timings are shortened through config; every wait is bounded by a
//! deadline so a stuck task fails the test instead of hanging it.

use std::thread::sleep;
use std::time::{Duration, Instant};

use pregate::config::AutoloadConfig;
use pregate::dispatch::QUEUE_DEPTH;
use pregate::{AutoloadService, LoadCommand, LoadMode};

use crate::mock_hw::{MockChannel, MockRegistry, MockStatus, RecordingSink};

const DEADLINE: Duration = Duration::from_secs(5);

fn fast_config() -> AutoloadConfig {
    AutoloadConfig {
        poll_interval_ms: 10,
        fault_backoff_ms: 100,
        dispatch_retry_ms: 100,
        dispatch_drain_ms: 10,
        ..AutoloadConfig::default()
    }
}

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < DEADLINE {
        if cond() {
            return true;
        }
        sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn insertion_is_loaded_end_to_end() {
    let registry = MockRegistry::lanes(&[false; 4]);
    let status = MockStatus::new("idle");
    let channel = MockChannel::new();
    let mut sink = RecordingSink::new();

    let service = AutoloadService::new(fast_config());
    let _tasks = service
        .start(&mut registry.clone(), status.clone(), channel.clone(), sink.clone())
        .unwrap();

    // Gate closed: nothing is read, so nothing runs yet.
    registry.set("mmu_pregate_0", true);
    sleep(Duration::from_millis(50));
    assert!(channel.executed().is_empty());
    assert_eq!(service.stats().ticks, 0);

    // The held insertion is seen on the first tick after the gate opens.
    service.handle_console_line("SP_HOME_DONE", &mut sink);
    registry.set("mmu_pregate_2", true);
    assert!(wait_until(|| channel.executed().len() == 2));
    assert_eq!(
        channel.executed(),
        vec![
            "SP_LOAD_HUB NO_SENSOR_CHECK=0 LANE=0",
            "SP_LOAD_HUB NO_SENSOR_CHECK=0 LANE=2",
        ]
    );
}

#[test]
fn busy_machine_holds_queue_until_idle() {
    let registry = MockRegistry::lanes(&[false; 4]);
    let status = MockStatus::new("idle");
    let channel = MockChannel::new();
    let mut sink = RecordingSink::new();

    let service = AutoloadService::new(fast_config());
    let _tasks = service
        .start(&mut registry.clone(), status.clone(), channel.clone(), sink.clone())
        .unwrap();
    service.handle_console_line("SP_HOME_DONE", &mut sink);

    status.set("paused");
    registry.set("mmu_pregate_1", true);
    assert!(wait_until(|| service.stats().commands_queued == 1));

    sleep(Duration::from_millis(250));
    assert!(channel.executed().is_empty());
    assert_eq!(service.queue().len(), 1);

    status.set("idle");
    assert!(wait_until(|| channel.executed().len() == 1));
    assert_eq!(channel.executed()[0], "SP_LOAD_HUB NO_SENSOR_CHECK=0 LANE=1");
    assert!(wait_until(|| !service.queue().is_active()));
}

#[test]
fn dispatcher_survives_a_panicking_channel() {
    let registry = MockRegistry::lanes(&[false; 4]);
    let status = MockStatus::new("idle");
    let channel = MockChannel::new();
    let mut sink = RecordingSink::new();

    let service = AutoloadService::new(fast_config());
    let _tasks = service
        .start(&mut registry.clone(), status.clone(), channel.clone(), sink.clone())
        .unwrap();
    service.handle_console_line("SP_HOME_DONE", &mut sink);

    channel.panic_once();
    registry.set("mmu_pregate_0", true);
    assert!(wait_until(|| service.stats().dispatch_faults == 1));
    assert!(wait_until(|| !service.queue().is_active()));

    registry.set("mmu_pregate_1", true);
    assert!(wait_until(|| channel.executed().len() == 2));
    assert_eq!(channel.executed()[1], "SP_LOAD_HUB NO_SENSOR_CHECK=0 LANE=1");
    assert_eq!(service.stats().commands_executed, 1);
    assert_eq!(service.stats().dispatch_faults, 1);
}

#[test]
fn sampler_backs_off_after_a_panicking_tick() {
    let registry = MockRegistry::lanes(&[false; 4]);
    let status = MockStatus::new("idle");
    let channel = MockChannel::new();
    let mut sink = RecordingSink::new();

    let service = AutoloadService::new(fast_config());
    let _tasks = service
        .start(&mut registry.clone(), status.clone(), channel.clone(), sink.clone())
        .unwrap();

    // Queue stays empty, so only the sampler reads the status.
    status.panic_once();
    service.handle_console_line("SP_HOME_DONE", &mut sink);
    assert!(wait_until(|| service.stats().loop_faults == 1));

    registry.set("mmu_pregate_2", true);
    assert!(wait_until(|| channel.executed().len() == 1));
    assert_eq!(channel.executed()[0], "SP_LOAD_HUB NO_SENSOR_CHECK=0 LANE=2");
    assert_eq!(service.stats().loop_faults, 1);
}

#[test]
fn sampler_keeps_running_after_a_full_queue() {
    let registry = MockRegistry::lanes(&[false; 4]);
    let status = MockStatus::new("paused");
    let channel = MockChannel::new();
    let mut sink = RecordingSink::new();

    let service = AutoloadService::new(fast_config());
    let _tasks = service
        .start(&mut registry.clone(), status.clone(), channel.clone(), sink.clone())
        .unwrap();
    service.handle_console_line("SP_HOME_DONE", &mut sink);

    for _ in 0..QUEUE_DEPTH {
        service
            .queue()
            .push(LoadCommand::new(3, LoadMode::GateFree).script())
            .unwrap();
    }
    registry.set("mmu_pregate_0", true);
    assert!(wait_until(|| service.stats().loop_faults == 1));
    assert_eq!(service.stats().commands_dropped, 1);

    status.set("idle");
    assert!(wait_until(|| channel.executed().len() == QUEUE_DEPTH));
    assert!(wait_until(|| !service.queue().is_active()));

    registry.set("mmu_pregate_1", true);
    assert!(wait_until(|| channel.executed().len() == QUEUE_DEPTH + 1));
    assert_eq!(
        channel.executed()[QUEUE_DEPTH],
        "SP_LOAD_HUB NO_SENSOR_CHECK=0 LANE=1"
    );
}
