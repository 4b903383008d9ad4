/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Backend for builds that have no task scheduler.
//!
//! The manager still accepts `begin`/`end` so application code links and runs
//! unchanged, but no task is ever created and no hook is ever invoked.

use std::convert::Infallible;
use std::ops::ControlFlow;

use super::tick::Delay;
use super::{Scheduler, SpawnError, TaskBody};
use crate::task::SpawnParams;

/// Scheduler stand-in with zero task capacity.
#[derive(Debug, Default, Clone, Copy)]
pub struct InertScheduler;

impl InertScheduler {
    pub fn new() -> Self {
        InertScheduler
    }
}

impl Scheduler for InertScheduler {
    type Handle = Infallible;

    fn is_available(&self) -> bool {
        false
    }

    fn tick_rate_hz(&self) -> u32 {
        super::thread::DEFAULT_TICK_RATE_HZ
    }

    fn spawn_pinned(
        &self,
        params: &SpawnParams,
        _body: TaskBody,
    ) -> Result<Infallible, SpawnError> {
        Err(SpawnError::Exhausted {
            task: params.name.clone(),
            limit: 0,
        })
    }

    fn delete(&self, handle: Infallible) {
        match handle {}
    }

    fn suspend(&self, _delay: Delay) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}
