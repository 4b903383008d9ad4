/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Error type returned by scheduler backends when a task cannot be created.
//!
//! The lifecycle manager never propagates these: a failed creation is logged
//! with the full variant and the slot is left empty, which is the same outcome
//! as an RTOS handing back a null task handle.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpawnError {
    /// The OS refused to create the thread backing a task.
    #[error("failed to spawn thread for task '{task}': {source}")]
    Thread {
        task: String,
        #[source]
        source: std::io::Error,
    },

    /// The backend cannot create any more tasks.
    #[error("task '{task}' not created: scheduler is out of task slots ({limit} max)")]
    Exhausted { task: String, limit: usize },
}
