// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("unknown pilot {0}")]
    UnknownPilot(String),

    /// A negative `used` or a unit reporting progress on a pilot that never
    /// received it (§7 "inconsistency errors"): fatal, halts scheduling.
    #[error("scheduler-inconsistent: {0}")]
    Inconsistent(String),
}
