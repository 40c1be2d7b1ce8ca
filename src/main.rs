//! Pregate autoload monitor: simulator entry point.
//!
//! Runs the full monitor against an in-memory feed unit driven from stdin.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  SimMachine            LogEventSink     JsonConfigFile       │
//! │  (Sensors · Status ·   (EventSink)      (ConfigPort)         │
//! │   ControlChannel)                                            │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │   AutoloadService                                  │      │
//! │  │   Sampler (thread) ─▶ CommandQueue ─▶ Dispatcher   │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Console lines:
//!
//! | Line              | Effect                                         |
//! |-------------------|------------------------------------------------|
//! | `insert <lane>`   | filament present at lane (or `downstream`)     |
//! | `remove <lane>`   | filament gone                                  |
//! | `fail <lane>`     | reads of that sensor start failing             |
//! | `heal <lane>`     | reads succeed again                            |
//! | `state <tag>`     | machine reports `<tag>` (idle, printing, ...)  |
//! | `stats`           | print counters                                 |
//! | `quit`            | exit                                           |
//! | anything else     | treated as a host console command              |
#![deny(unused_must_use)]

use std::io::BufRead;

use anyhow::{Context, Result};
use log::{info, warn};

use pregate::adapters::config_file::JsonConfigFile;
use pregate::adapters::log_sink::LogEventSink;
use pregate::adapters::sim::SimMachine;
use pregate::app::ports::ConfigPort;
use pregate::config::AutoloadConfig;
use pregate::{AutoloadService, diagnostics};

const DEFAULT_CONFIG_PATH: &str = "pregate.json";

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    diagnostics::install_panic_handler();

    info!("╔══════════════════════════════════════╗");
    info!("║  pregate v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config (file or defaults) ──────────────────────────
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());
    let config = match JsonConfigFile::new(&path).load() {
        Ok(c) => c,
        Err(e) => {
            warn!("Config '{}' unusable ({}), running with defaults", path, e);
            AutoloadConfig::default()
        }
    };

    // ── 3. Adapters + service ─────────────────────────────────
    let sim = SimMachine::from_config(&config);
    let service = AutoloadService::new(config);
    let _tasks = service
        .start(&mut sim.clone(), sim.clone(), sim.clone(), LogEventSink)
        .context("failed to start autoload tasks")?;

    info!(
        "Ready for console input ('{}' opens the gate)",
        service.config().ready_command
    );

    // ── 4. Console loop ───────────────────────────────────────
    let mut sink = LogEventSink;
    for line in std::io::stdin().lock().lines() {
        let line = line.context("stdin read failed")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }
        if !handle_sim_line(line, &sim, &service)
            && !service.handle_console_line(line, &mut sink)
        {
            warn!("Unknown command: '{}'", line);
        }
    }

    info!("Console closed, shutting down");
    Ok(())
}

/// Simulator controls.  Returns `false` when `line` is not one of them.
fn handle_sim_line(line: &str, sim: &SimMachine, service: &AutoloadService) -> bool {
    let mut words = line.split_whitespace();
    let (Some(verb), arg) = (words.next(), words.next()) else {
        return false;
    };

    match (verb, arg) {
        ("insert" | "remove" | "fail" | "heal", Some(target)) => {
            let Some(name) = sensor_name(service.config(), target) else {
                warn!("No sensor for '{}'", target);
                return true;
            };
            match verb {
                "insert" => sim.set_present(name, true),
                "remove" => sim.set_present(name, false),
                "fail" => sim.set_failing(name, true),
                _ => sim.set_failing(name, false),
            };
            info!("SIM   | {} {}", verb, name);
            true
        }
        ("state", Some(tag)) => {
            sim.set_state(tag);
            true
        }
        ("stats", None) => {
            match serde_json::to_string(&service.stats()) {
                Ok(json) => info!("STATS | {} | queued_now={}", json, service.queue().len()),
                Err(e) => warn!("STATS | encode failed: {}", e),
            }
            true
        }
        _ => false,
    }
}

/// `downstream` or a lane index → configured sensor name.
fn sensor_name<'a>(config: &'a AutoloadConfig, target: &str) -> Option<&'a str> {
    if target.eq_ignore_ascii_case("downstream") {
        return config.downstream_sensor.as_deref();
    }
    let lane: usize = target.parse().ok()?;
    config.lane_sensors.get(lane).map(String::as_str)
}
