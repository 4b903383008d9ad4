/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! User callbacks bound to the six slots.
//!
//! Each slot has at most one [`Hook`].  A slot left empty runs the default
//! behaviour of the backend it is started on:
//!
//! | Backend | Unset hook |
//! |---|---|
//! | real scheduler ([`ThreadScheduler`](crate::scheduler::ThreadScheduler), an RTOS port) | task terminates itself before its first iteration |
//! | no scheduler ([`InertScheduler`](crate::scheduler::InertScheduler)) | nothing is scheduled; [`Hooks::call`] is a no-op |
//!
//! Hooks are shared between the manager and the running tasks, and a restart
//! binds the same hook to a fresh task, so they are reference-counted.

use std::fmt;
use std::sync::Arc;

use crate::task::Slot;

/// Periodic unit of work bound to one slot.
///
/// A hook may be cut off at any point when its task is destroyed, so it must
/// not hold state across iterations that an abrupt stop would corrupt.
pub type Hook = Arc<dyn Fn() + Send + Sync + 'static>;

/// The six hook slots.
#[derive(Clone, Default)]
pub struct Hooks {
    slots: [Option<Hook>; Slot::COUNT],
}

impl Hooks {
    /// All six slots unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Hooks::set`].
    pub fn on<F>(mut self, slot: Slot, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.set(slot, f);
        self
    }

    /// Bind `f` to `slot`, replacing any previous hook.
    pub fn set<F>(&mut self, slot: Slot, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.slots[slot.index()] = Some(Arc::new(f));
    }

    /// Unset `slot`, returning its hook if one was bound.
    pub fn clear(&mut self, slot: Slot) -> Option<Hook> {
        self.slots[slot.index()].take()
    }

    pub fn get(&self, slot: Slot) -> Option<&Hook> {
        self.slots[slot.index()].as_ref()
    }

    pub fn is_set(&self, slot: Slot) -> bool {
        self.slots[slot.index()].is_some()
    }

    /// Run the hook of `slot` once on the calling thread.  Unset slots are a
    /// no-op.
    pub fn call(&self, slot: Slot) {
        if let Some(hook) = self.get(slot) {
            hook();
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set: Vec<String> = Slot::ALL
            .into_iter()
            .filter(|s| self.is_set(*s))
            .map(|s| s.name())
            .collect();
        f.debug_struct("Hooks").field("set", &set).finish()
    }
}
