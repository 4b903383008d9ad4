/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Task lifecycle manager.
//!
//! [`AutoTask`] owns at most one running task per [`Slot`].  Starting is
//! restart-with-replacement: for every slot the previous task (if any) is
//! deleted before the new one is created, so a slot is never occupied twice
//! and no task is leaked.
//!
//! ```text
//! begin*(config) ──► start_tasks ──► for each slot:
//!                                      delete old handle (if Some)
//!                                      spawn_pinned(name, stack, prio, core)
//!                                          └─► loop { hook(); suspend(delay) }
//! end()          ──► for each slot: delete handle (if Some), set None
//! ```
//!
//! Each task captures its own [`Delay`] when it is created.  Reconfiguring
//! never touches state a running task reads.
//!
//! # Example
//! ```rust
//! use std::sync::Arc;
//! use autotask::{AutoTask, Hooks, Slot, ThreadScheduler};
//!
//! let hooks = Hooks::new().on(Slot::CORE0_HIGH, || { /* periodic work */ });
//! let mut tasks = AutoTask::with_hooks(Arc::new(ThreadScheduler::new()), hooks);
//!
//! tasks.begin_with_stack_size(4096);
//! assert!(tasks.is_running(Slot::CORE0_HIGH));
//!
//! tasks.end();
//! assert!(tasks.running_slots().is_empty());
//! ```

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::Config;
use crate::hooks::{Hook, Hooks};
use crate::scheduler::{Delay, Scheduler, TaskBody};
use crate::task::{Slot, SpawnParams};

// ── AutoTask ──────────────────────────────────────────────────────────────────

/// Starts, replaces and stops the six slot tasks on a [`Scheduler`].
///
/// None of the operations can fail.  Task-creation errors from the backend
/// are logged and leave the slot empty.
pub struct AutoTask<S: Scheduler> {
    scheduler: Arc<S>,
    hooks: Hooks,
    /// Configuration of the most recent start.
    config: Config,
    started: bool,
    handles: [Option<S::Handle>; Slot::COUNT],
}

impl<S: Scheduler> AutoTask<S> {
    /// Manager with no hooks bound: every slot runs the default behaviour.
    pub fn new(scheduler: Arc<S>) -> Self {
        Self::with_hooks(scheduler, Hooks::new())
    }

    pub fn with_hooks(scheduler: Arc<S>, hooks: Hooks) -> Self {
        Self {
            scheduler,
            hooks,
            config: Config::default(),
            started: false,
            handles: std::array::from_fn(|_| None),
        }
    }

    pub fn scheduler(&self) -> &Arc<S> {
        &self.scheduler
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Replace the hooks.  Takes effect at the next `begin*`; running tasks
    /// keep the hook they were created with.
    pub fn set_hooks(&mut self, hooks: Hooks) {
        self.hooks = hooks;
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Start all six tasks with [`Config::default`].
    pub fn begin(&mut self) {
        self.start_tasks(Config::default());
    }

    /// Start all six tasks with default settings except `stack_size`, which
    /// is used for every slot.
    pub fn begin_with_stack_size(&mut self, stack_size: u32) {
        self.start_tasks(Config::with_stack_size(stack_size));
    }

    /// Start all six tasks with `config`, taken verbatim.
    pub fn begin_with_config(&mut self, config: Config) {
        self.start_tasks(config);
    }

    /// Delete every running slot task.  Safe to call at any time, any number
    /// of times.
    pub fn end(&mut self) {
        let mut stopped = 0usize;
        for slot in Slot::ALL {
            if let Some(handle) = self.handles[slot.index()].take() {
                debug!(slot = %slot, ?handle, "deleting task");
                self.scheduler.delete(handle);
                stopped += 1;
            }
        }
        if self.started || stopped > 0 {
            info!(stopped, "AutoTask stopped");
        }
        self.started = false;
    }

    fn start_tasks(&mut self, config: Config) {
        self.config = config;
        self.started = true;

        if !self.scheduler.is_available() {
            debug!("no task scheduler on this platform; slot tasks not created");
            return;
        }

        let tick_rate_hz = self.scheduler.tick_rate_hz();
        info!(tick_rate_hz, hooks = ?self.hooks, "=== AutoTask starting slot tasks ===");

        for slot in Slot::ALL {
            self.replace_task(slot, tick_rate_hz);
        }

        info!(
            running = self.running_slots().len(),
            "=== AutoTask started ==="
        );
    }

    /// Delete the task occupying `slot` (if any), then create its
    /// replacement from the current configuration.
    fn replace_task(&mut self, slot: Slot, tick_rate_hz: u32) {
        if let Some(old) = self.handles[slot.index()].take() {
            debug!(slot = %slot, handle = ?old, "replacing running task");
            self.scheduler.delete(old);
        }

        let spec = *self.config.get(slot);
        let params = SpawnParams::for_slot(slot, &spec);
        let delay = Delay::from_period(spec.period_ms, tick_rate_hz);
        let body = self.task_body(slot, delay);

        match self.scheduler.spawn_pinned(&params, body) {
            Ok(handle) => {
                debug!(
                    slot = %slot,
                    core = params.core_id,
                    priority = spec.priority,
                    stack_size = spec.stack_size,
                    period_ms = spec.period_ms,
                    ?delay,
                    "task created"
                );
                self.handles[slot.index()] = Some(handle);
            }
            Err(e) => {
                error!(slot = %slot, "task creation failed: {e}");
            }
        }
    }

    fn task_body(&self, slot: Slot, delay: Delay) -> TaskBody {
        match self.hooks.get(slot) {
            Some(hook) => {
                let hook = hook.clone();
                let scheduler = self.scheduler.clone();
                Box::new(move || run_slot(scheduler.as_ref(), delay, &hook))
            }
            None => {
                debug!(slot = %slot, "no hook bound; task exits on first run");
                Box::new(|| {})
            }
        }
    }

    // ── Inspection ────────────────────────────────────────────────────────────

    /// Configuration passed to the most recent `begin*` (defaults before the
    /// first one).
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `true` between a `begin*` and the next [`end`](Self::end).
    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn handle(&self, slot: Slot) -> Option<&S::Handle> {
        self.handles[slot.index()].as_ref()
    }

    /// `true` if the manager holds a task handle for `slot`.
    pub fn is_running(&self, slot: Slot) -> bool {
        self.handles[slot.index()].is_some()
    }

    /// Slots with a task handle, in [`Slot::ALL`] order.
    pub fn running_slots(&self) -> Vec<Slot> {
        Slot::ALL
            .into_iter()
            .filter(|s| self.is_running(*s))
            .collect()
    }
}

impl<S: Scheduler> Drop for AutoTask<S> {
    fn drop(&mut self) {
        self.end();
    }
}

impl<S: Scheduler + std::fmt::Debug> std::fmt::Debug for AutoTask<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoTask")
            .field("scheduler", &self.scheduler)
            .field("hooks", &self.hooks)
            .field("config", &self.config)
            .field("started", &self.started)
            .field("handles", &self.handles)
            .finish()
    }
}

// ── Slot task loop ────────────────────────────────────────────────────────────

/// Body of one slot task: invoke the hook, suspend, repeat until the task is
/// deleted.
fn run_slot<S: Scheduler + ?Sized>(scheduler: &S, delay: Delay, hook: &Hook) {
    loop {
        hook();
        if scheduler.suspend(delay).is_break() {
            return;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
