//! Scheduler backends the lifecycle manager runs on.
//!
//! The manager does not schedule anything itself.  It needs five primitives
//! from the underlying RTOS, captured by the [`Scheduler`] trait:
//!
//! | Primitive | FreeRTOS equivalent |
//! |---|---|
//! | [`spawn_pinned`](Scheduler::spawn_pinned) | `xTaskCreatePinnedToCore` |
//! | [`delete`](Scheduler::delete) | `vTaskDelete(handle)` |
//! | [`suspend`](Scheduler::suspend) with [`Delay::Yield`] | `taskYIELD()` |
//! | [`suspend`](Scheduler::suspend) with [`Delay::Ticks`] | `vTaskDelay(ticks)` |
//! | [`tick_rate_hz`](Scheduler::tick_rate_hz) | `configTICK_RATE_HZ` |
//!
//! Two backends ship with the crate:
//!
//! * [`ThreadScheduler`] — one OS thread per task, for hosts and tests.
//! * [`InertScheduler`] — a build without a task scheduler; nothing runs.
//!
//! A task body that returns is the task deleting itself.

pub mod error;
pub mod inert;
pub mod thread;
pub mod tick;

pub use error::SpawnError;
pub use inert::InertScheduler;
pub use thread::{TaskRecord, TaskState, ThreadHandle, ThreadScheduler};
pub use tick::{ms_to_ticks, Delay};

use std::fmt;
use std::ops::ControlFlow;

use crate::task::SpawnParams;

/// Code a task runs.  Returning from it ends the task.
pub type TaskBody = Box<dyn FnOnce() + Send + 'static>;

/// Task-creation and suspension primitives of a preemptive RTOS.
///
/// Implementations must be shareable across the tasks they run: the manager
/// keeps one `Arc<S>` and every task loop holds a clone of it.
pub trait Scheduler: Send + Sync + 'static {
    /// Owned reference to a created task.  Consumed by [`Scheduler::delete`].
    type Handle: Send + fmt::Debug;

    /// `false` for builds without a task scheduler.  The manager creates no
    /// tasks on such a backend.
    fn is_available(&self) -> bool {
        true
    }

    /// Scheduler ticks per second.
    fn tick_rate_hz(&self) -> u32;

    /// Create a task running `body`, pinned to `params.core_id`.
    fn spawn_pinned(
        &self,
        params: &SpawnParams,
        body: TaskBody,
    ) -> Result<Self::Handle, SpawnError>;

    /// Destroy a task immediately, without waiting for it to reach any
    /// particular point.  Deleting a task that already ended is harmless.
    fn delete(&self, handle: Self::Handle);

    /// Suspend the calling task according to `delay`.
    ///
    /// Returns [`ControlFlow::Break`] when the calling task has been deleted
    /// and must not run any further code.
    fn suspend(&self, delay: Delay) -> ControlFlow<()>;
}
