/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Host backend: every task is an OS thread.
//!
//! Emulates the RTOS primitives closely enough to run the lifecycle manager
//! on a development machine and in tests:
//!
//! * task name, requested stack size, priority and core id are recorded and
//!   visible through [`ThreadScheduler::tasks`]; stack size is also passed to
//!   the OS (never below [`HOST_MIN_STACK_SIZE`]), priority and core are not
//!   enforced;
//! * tick delays sleep for `ticks / tick_rate_hz` seconds;
//! * [`delete`](Scheduler::delete) removes the task record at once and wakes
//!   the thread.  A host thread cannot be killed from outside, so the task
//!   stops at its next suspension point; the manager never waits for that.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, Thread};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::tick::{tick_period_ns, Delay};
use super::{Scheduler, SpawnError, TaskBody};
use crate::task::SpawnParams;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Tick rate used unless [`ThreadScheduler::with_tick_rate`] says otherwise.
/// Matches the 1 kHz FreeRTOS tick of ESP32 targets.
pub const DEFAULT_TICK_RATE_HZ: u32 = 1_000;

/// Smallest stack handed to the OS for a task thread.  Embedded stack sizes
/// (a few KiB) are too small for a hosted thread.
pub const HOST_MIN_STACK_SIZE: usize = 64 * 1024;

// ── Public task inspection types ──────────────────────────────────────────────

/// Lifecycle state of a task that has not been deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Body still executing (or suspended between iterations).
    Running,
    /// Body returned, i.e. the task deleted itself.
    Exited,
}

/// Snapshot of one task created by a [`ThreadScheduler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: u64,
    pub name: String,
    /// Stack size as requested, before the host minimum is applied.
    pub stack_size: u32,
    pub priority: u32,
    pub core_id: u32,
    pub state: TaskState,
}

/// Handle returned by [`ThreadScheduler::spawn_pinned`].
#[derive(Debug, PartialEq, Eq)]
pub struct ThreadHandle {
    id: u64,
}

impl ThreadHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

// ── Internal state ────────────────────────────────────────────────────────────

/// Flags shared between the scheduler and one task thread.
#[derive(Debug, Default)]
struct TaskControl {
    deleted: AtomicBool,
    exited: AtomicBool,
}

/// Marks the task as exited however its body ends, including by panic.
struct ExitGuard(Arc<TaskControl>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.0.exited.store(true, Ordering::SeqCst);
    }
}

struct Entry {
    params: SpawnParams,
    control: Arc<TaskControl>,
    thread: Thread,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    tasks: BTreeMap<u64, Entry>,
}

thread_local! {
    /// Control block of the task running on this thread, if any.
    static CURRENT: RefCell<Option<Arc<TaskControl>>> = const { RefCell::new(None) };
}

fn current_task() -> Option<Arc<TaskControl>> {
    CURRENT.with(|c| c.borrow().clone())
}

// ── ThreadScheduler ───────────────────────────────────────────────────────────

/// [`Scheduler`] backed by `std::thread`.
pub struct ThreadScheduler {
    tick_rate_hz: u32,
    max_tasks: Option<usize>,
    registry: Mutex<Registry>,
}

impl ThreadScheduler {
    /// Unlimited tasks at [`DEFAULT_TICK_RATE_HZ`].
    pub fn new() -> Self {
        Self::with_tick_rate(DEFAULT_TICK_RATE_HZ)
    }

    pub fn with_tick_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            max_tasks: None,
            registry: Mutex::new(Registry::default()),
        }
    }

    /// Refuse to create more than `limit` concurrently running tasks, the way
    /// an RTOS runs out of memory for task control blocks.
    pub fn with_task_limit(mut self, limit: usize) -> Self {
        self.max_tasks = Some(limit);
        self
    }

    /// Snapshot of every task that has not been deleted, oldest first.
    pub fn tasks(&self) -> Vec<TaskRecord> {
        self.lock()
            .tasks
            .iter()
            .map(|(&id, e)| TaskRecord {
                id,
                name: e.params.name.clone(),
                stack_size: e.params.stack_size,
                priority: e.params.priority,
                core_id: e.params.core_id,
                state: if e.control.exited.load(Ordering::SeqCst) {
                    TaskState::Exited
                } else {
                    TaskState::Running
                },
            })
            .collect()
    }

    /// Snapshot of the task named `name`, if it exists and was not deleted.
    pub fn task(&self, name: &str) -> Option<TaskRecord> {
        self.tasks().into_iter().find(|t| t.name == name)
    }

    /// Tasks whose body is still running.
    pub fn running_tasks(&self) -> Vec<TaskRecord> {
        self.tasks()
            .into_iter()
            .filter(|t| t.state == TaskState::Running)
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn tick(&self) -> Duration {
        Duration::from_nanos(tick_period_ns(self.tick_rate_hz))
    }
}

impl Default for ThreadScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ThreadScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadScheduler")
            .field("tick_rate_hz", &self.tick_rate_hz)
            .field("max_tasks", &self.max_tasks)
            .field("tasks", &self.lock().tasks.len())
            .finish()
    }
}

impl Scheduler for ThreadScheduler {
    type Handle = ThreadHandle;

    fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz
    }

    fn spawn_pinned(
        &self,
        params: &SpawnParams,
        body: TaskBody,
    ) -> Result<ThreadHandle, SpawnError> {
        let mut registry = self.lock();

        if let Some(limit) = self.max_tasks {
            let running = registry
                .tasks
                .values()
                .filter(|e| !e.control.exited.load(Ordering::SeqCst))
                .count();
            if running >= limit {
                return Err(SpawnError::Exhausted {
                    task: params.name.clone(),
                    limit,
                });
            }
        }

        let control = Arc::new(TaskControl::default());
        let task_control = control.clone();
        let stack = (params.stack_size as usize).max(HOST_MIN_STACK_SIZE);

        let join = thread::Builder::new()
            .name(params.name.clone())
            .stack_size(stack)
            .spawn(move || {
                let _guard = ExitGuard(task_control.clone());
                CURRENT.with(|c| *c.borrow_mut() = Some(task_control));
                body();
            })
            .map_err(|source| SpawnError::Thread {
                task: params.name.clone(),
                source,
            })?;

        let id = registry.next_id;
        registry.next_id += 1;
        registry.tasks.insert(
            id,
            Entry {
                params: params.clone(),
                control,
                thread: join.thread().clone(),
            },
        );

        debug!(
            id,
            task = %params.name,
            core = params.core_id,
            priority = params.priority,
            stack_size = params.stack_size,
            "thread task created"
        );

        // Dropping the JoinHandle detaches the thread; deletion never joins.
        Ok(ThreadHandle { id })
    }

    fn delete(&self, handle: ThreadHandle) {
        let Some(entry) = self.lock().tasks.remove(&handle.id) else {
            return;
        };
        entry.control.deleted.store(true, Ordering::SeqCst);
        entry.thread.unpark();
        debug!(id = handle.id, task = %entry.params.name, "thread task deleted");
    }

    fn suspend(&self, delay: Delay) -> ControlFlow<()> {
        let control = current_task();
        let deleted = || {
            control
                .as_ref()
                .is_some_and(|c| c.deleted.load(Ordering::SeqCst))
        };

        match delay {
            Delay::Yield => {
                if !deleted() {
                    thread::yield_now();
                }
            }
            Delay::Ticks(ticks) => {
                let deadline = Instant::now() + self.tick() * ticks;
                trace!(ticks, "task delay");
                // park_timeout can wake spuriously; loop until the deadline or
                // until the task is deleted.
                while !deleted() {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    thread::park_timeout(deadline - now);
                }
            }
        }

        if deleted() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn params(name: &str, core_id: u32) -> SpawnParams {
        SpawnParams {
            name: name.to_string(),
            stack_size: 4096,
            priority: 3,
            core_id,
        }
    }

    /// Poll `cond` every millisecond for up to two seconds.
    fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        cond()
    }

    /// Body that loops on `suspend` until deleted, counting iterations.
    fn looping_body(
        sched: Arc<ThreadScheduler>,
        count: Arc<AtomicUsize>,
        delay: Delay,
    ) -> TaskBody {
        Box::new(move || loop {
            count.fetch_add(1, Ordering::SeqCst);
            if sched.suspend(delay).is_break() {
                break;
            }
        })
    }

    #[test]
    fn spawn_records_requested_parameters() {
        let sched = Arc::new(ThreadScheduler::new());
        let count = Arc::new(AtomicUsize::new(0));
        let h = sched
            .spawn_pinned(
                &params("core1-normal", 1),
                looping_body(sched.clone(), count, Delay::Ticks(1)),
            )
            .unwrap();

        let rec = sched.task("core1-normal").unwrap();
        assert_eq!(rec.id, h.id());
        assert_eq!(rec.core_id, 1);
        assert_eq!(rec.priority, 3);
        assert_eq!(rec.stack_size, 4096, "requested size, not the host floor");
        assert_eq!(rec.state, TaskState::Running);

        sched.delete(h);
        assert!(sched.tasks().is_empty());
    }

    #[test]
    fn returning_body_marks_task_exited() {
        let sched = ThreadScheduler::new();
        let _h = sched
            .spawn_pinned(&params("short", 0), Box::new(|| {}))
            .unwrap();
        assert!(wait_for(|| sched.task("short").unwrap().state == TaskState::Exited));
        assert!(sched.running_tasks().is_empty());
    }

    #[test]
    fn delete_stops_a_delayed_task() {
        let sched = Arc::new(ThreadScheduler::new());
        let count = Arc::new(AtomicUsize::new(0));
        // 10 s delay: the task can only stop this fast if delete wakes it.
        let h = sched
            .spawn_pinned(
                &params("sleeper", 0),
                looping_body(sched.clone(), count.clone(), Delay::Ticks(10_000)),
            )
            .unwrap();
        assert!(wait_for(|| count.load(Ordering::SeqCst) == 1));

        sched.delete(h);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(sched.task("sleeper").is_none());
    }

    #[test]
    fn delete_stops_a_yielding_task() {
        let sched = Arc::new(ThreadScheduler::new());
        let count = Arc::new(AtomicUsize::new(0));
        let h = sched
            .spawn_pinned(
                &params("spinner", 1),
                looping_body(sched.clone(), count.clone(), Delay::Yield),
            )
            .unwrap();
        assert!(wait_for(|| count.load(Ordering::SeqCst) > 100));

        sched.delete(h);
        thread::sleep(Duration::from_millis(20));
        let settled = count.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(count.load(Ordering::SeqCst), settled);
    }

    #[test]
    fn tick_delay_sleeps_at_least_one_tick() {
        // 100 Hz → one tick is 10 ms.
        let sched = Arc::new(ThreadScheduler::with_tick_rate(100));
        let count = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();
        let h = sched
            .spawn_pinned(
                &params("ticker", 0),
                looping_body(sched.clone(), count.clone(), Delay::Ticks(1)),
            )
            .unwrap();
        assert!(wait_for(|| count.load(Ordering::SeqCst) >= 4));
        let elapsed = start.elapsed();
        sched.delete(h);

        // Three full delays separate the first and fourth iteration.
        assert!(elapsed >= Duration::from_millis(30), "elapsed {elapsed:?}");
    }

    #[test]
    fn task_limit_refuses_extra_tasks() {
        let sched = Arc::new(ThreadScheduler::new().with_task_limit(1));
        let count = Arc::new(AtomicUsize::new(0));
        let h = sched
            .spawn_pinned(
                &params("first", 0),
                looping_body(sched.clone(), count.clone(), Delay::Ticks(1)),
            )
            .unwrap();

        let err = sched
            .spawn_pinned(&params("second", 0), Box::new(|| {}))
            .unwrap_err();
        assert!(matches!(err, SpawnError::Exhausted { limit: 1, .. }));

        sched.delete(h);
        let h2 = sched.spawn_pinned(&params("third", 1), Box::new(|| {}));
        assert!(h2.is_ok());
    }

    #[test]
    fn suspend_outside_a_task_continues() {
        let sched = ThreadScheduler::new();
        assert!(sched.suspend(Delay::Yield).is_continue());
        assert!(sched.suspend(Delay::Ticks(1)).is_continue());
    }
}
