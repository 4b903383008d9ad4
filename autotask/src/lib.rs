/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! AutoTask – six-slot periodic task lifecycle manager
//!
//! Runs up to six user hooks periodically, one per `(core, tier)` slot on a
//! dual-core RTOS target, on top of a preemptive scheduler it does not
//! implement itself.
//!
//! ```text
//! lib.rs
//! ├── config/      – TaskSpec / CoreSpec / Config, defaults, YAML loading
//! ├── task         – Core, Tier, Slot, SpawnParams
//! ├── hooks        – the six overridable slot callbacks
//! ├── scheduler/   – Scheduler trait, tick conversion, thread + inert backends
//! └── manager      – AutoTask: begin / end, per-slot task loop
//! ```

pub mod config;
pub mod hooks;
pub mod manager;
pub mod scheduler;
pub mod task;

pub use config::{Config, CoreSpec, TaskSpec};
pub use hooks::{Hook, Hooks};
pub use manager::AutoTask;
pub use scheduler::{InertScheduler, Scheduler, ThreadScheduler};
pub use task::{Core, Slot, Tier};
