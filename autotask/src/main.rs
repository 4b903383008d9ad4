/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, error, info, warn};

use autotask::config::Config;
use autotask::scheduler::thread::DEFAULT_TICK_RATE_HZ;
use autotask::{AutoTask, Hooks, Slot, ThreadScheduler};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Run the AutoTask slot manager on the host thread scheduler.
///
/// Example:
///   autotask --config demos/autotask.yaml --hook core0-high --hook core1-low \
///            --duration-ms 2000
#[derive(Debug, Parser)]
#[command(
    name = "autotask",
    about = "AutoTask – six-slot periodic task runner (host demo)",
    long_about = None,
)]
struct Cli {
    /// Path to a YAML slot configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Stack size in bytes for all six slots (ignored when --config is given).
    #[arg(short = 's', long = "stack-size")]
    stack_size: Option<u32>,

    /// Scheduler tick rate in Hz.
    #[arg(short = 't', long = "tick-rate", default_value_t = DEFAULT_TICK_RATE_HZ)]
    tick_rate_hz: u32,

    /// How long to let the tasks run before stopping them.
    #[arg(short = 'd', long = "duration-ms", default_value_t = 1000)]
    duration_ms: u64,

    /// Slot that gets a counting demo hook (e.g. core0-high).  Repeatable.
    /// Slots without a hook exit on their first run.
    #[arg(long = "hook", value_parser = parse_slot)]
    hooks: Vec<Slot>,
}

fn parse_slot(s: &str) -> Result<Slot, String> {
    Slot::from_name(s).ok_or_else(|| {
        let valid: Vec<String> = Slot::ALL.iter().map(|s| s.name()).collect();
        format!("unknown slot '{s}' (valid: {})", valid.join(", "))
    })
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_thread_names(true)
        .init();

    info!("AutoTask demo starting up...");

    let cli = Cli::parse();

    info!(
        config       = ?cli.config,
        stack_size   = ?cli.stack_size,
        tick_rate_hz = cli.tick_rate_hz,
        duration_ms  = cli.duration_ms,
        hooks        = ?cli.hooks,
        "Configuration"
    );

    // ── Resolve slot configuration ────────────────────────────────────────────
    let config = match (&cli.config, cli.stack_size) {
        (Some(path), stack) => {
            if stack.is_some() {
                warn!("--stack-size is ignored when --config is given");
            }
            match Config::load_from_file(path) {
                Ok(cfg) => cfg,
                Err(e) => {
                    error!("Failed to load task configuration: {:#}", e);
                    process::exit(1);
                }
            }
        }
        (None, Some(bytes)) => Config::with_stack_size(bytes),
        (None, None) => Config::default(),
    };

    // ── Demo hooks ────────────────────────────────────────────────────────────
    let counters: Arc<[AtomicU64; Slot::COUNT]> = Arc::new(Default::default());
    let mut hooks = Hooks::new();
    for &slot in &cli.hooks {
        let counters = counters.clone();
        hooks.set(slot, move || {
            let n = counters[slot.index()].fetch_add(1, Ordering::Relaxed) + 1;
            debug!(slot = %slot, iteration = n, "tick");
        });
    }
    if cli.hooks.is_empty() {
        warn!("No --hook given: every slot task will exit immediately");
    }

    // ── Run ───────────────────────────────────────────────────────────────────
    let scheduler = Arc::new(ThreadScheduler::with_tick_rate(cli.tick_rate_hz));
    let mut tasks = AutoTask::with_hooks(scheduler.clone(), hooks);
    tasks.begin_with_config(config);

    thread::sleep(Duration::from_millis(cli.duration_ms));

    let live = scheduler.tasks();
    tasks.end();

    // ── Report ────────────────────────────────────────────────────────────────
    info!("Slot summary after {}ms:", cli.duration_ms);
    for slot in Slot::ALL {
        let spec = config.get(slot);
        let state = live
            .iter()
            .find(|t| t.name == slot.name())
            .map(|t| format!("{:?}", t.state))
            .unwrap_or_else(|| String::from("NotCreated"));
        info!(
            "  [{slot}]  prio={prio}  stack={stack}  period={period}ms  state={state}  iterations={n}",
            prio = spec.priority,
            stack = spec.stack_size,
            period = spec.period_ms,
            n = counters[slot.index()].load(Ordering::Relaxed),
        );
    }
}
