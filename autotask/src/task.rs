/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Slot identity and task creation parameters.
//!
//! The manager runs exactly six tasks, one per `(core, tier)` pair:
//!
//! ```text
//!            low           normal          high
//! core 0  core0-low     core0-normal    core0-high
//! core 1  core1-low     core1-normal    core1-high
//! ```
//!
//! A [`Slot`] names one cell of that table.  It is the key for everything the
//! manager stores per task: the [`TaskSpec`](crate::config::TaskSpec) in the
//! configuration, the user hook in [`Hooks`](crate::hooks::Hooks) and the
//! backend handle of the running task.

use std::fmt;

// ── Core ──────────────────────────────────────────────────────────────────────

/// Physical execution unit a task is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Core {
    Core0,
    Core1,
}

impl Core {
    /// Both cores, in id order.
    pub const ALL: [Core; 2] = [Core::Core0, Core::Core1];

    /// Core id handed to the scheduler's pinned-create primitive.
    pub fn id(self) -> u32 {
        match self {
            Core::Core0 => 0,
            Core::Core1 => 1,
        }
    }
}

// ── Tier ──────────────────────────────────────────────────────────────────────

/// Priority tier of a slot within its core.
///
/// The tier is only a name; the scheduler priority actually used comes from
/// the slot's [`TaskSpec`](crate::config::TaskSpec).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Low,
    Normal,
    High,
}

impl Tier {
    /// All tiers, lowest first.
    pub const ALL: [Tier; 3] = [Tier::Low, Tier::Normal, Tier::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Normal => "normal",
            Tier::High => "high",
        }
    }
}

// ── Slot ──────────────────────────────────────────────────────────────────────

/// One of the six fixed `(core, tier)` execution contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub core: Core,
    pub tier: Tier,
}

impl Slot {
    pub const CORE0_LOW: Slot = Slot::new(Core::Core0, Tier::Low);
    pub const CORE0_NORMAL: Slot = Slot::new(Core::Core0, Tier::Normal);
    pub const CORE0_HIGH: Slot = Slot::new(Core::Core0, Tier::High);
    pub const CORE1_LOW: Slot = Slot::new(Core::Core1, Tier::Low);
    pub const CORE1_NORMAL: Slot = Slot::new(Core::Core1, Tier::Normal);
    pub const CORE1_HIGH: Slot = Slot::new(Core::Core1, Tier::High);

    /// Number of slots managed by [`AutoTask`](crate::manager::AutoTask).
    pub const COUNT: usize = 6;

    /// Every slot, core-major and lowest tier first.  [`Slot::index`] is the
    /// position of a slot in this array.
    pub const ALL: [Slot; Slot::COUNT] = [
        Slot::CORE0_LOW,
        Slot::CORE0_NORMAL,
        Slot::CORE0_HIGH,
        Slot::CORE1_LOW,
        Slot::CORE1_NORMAL,
        Slot::CORE1_HIGH,
    ];

    pub const fn new(core: Core, tier: Tier) -> Self {
        Self { core, tier }
    }

    /// Position of this slot in [`Slot::ALL`]; used to index per-slot arrays.
    pub fn index(self) -> usize {
        let core = match self.core {
            Core::Core0 => 0,
            Core::Core1 => 1,
        };
        let tier = match self.tier {
            Tier::Low => 0,
            Tier::Normal => 1,
            Tier::High => 2,
        };
        core * Tier::ALL.len() + tier
    }

    /// Task name registered with the scheduler, e.g. `"core0-high"`.
    pub fn name(self) -> String {
        self.to_string()
    }

    /// Parse a task name produced by [`Slot::name`].
    pub fn from_name(name: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "core{}-{}", self.core.id(), self.tier.as_str())
    }
}

// ── SpawnParams ───────────────────────────────────────────────────────────────

/// Everything a scheduler backend needs to create one pinned task.
///
/// Values are forwarded exactly as configured.  Zero stack sizes or
/// out-of-range priorities are the backend's problem, not the manager's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnParams {
    /// Task name, see [`Slot::name`].
    pub name: String,
    /// Stack size in bytes.
    pub stack_size: u32,
    /// Scheduler priority (higher number = more urgent, FreeRTOS convention).
    pub priority: u32,
    /// Core the task is pinned to.
    pub core_id: u32,
}

impl SpawnParams {
    pub fn for_slot(slot: Slot, spec: &crate::config::TaskSpec) -> Self {
        SpawnParams {
            name: slot.name(),
            stack_size: spec.stack_size,
            priority: spec.priority,
            core_id: slot.core.id(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
