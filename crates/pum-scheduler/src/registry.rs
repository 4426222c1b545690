// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plug-in dispatch (§9 "Scheduler plug-ins"): construct the configured
//! [`Scheduler`] from a [`Config`] without the caller needing to know the
//! concrete type.

use crate::backfilling::Backfilling;
use crate::round_robin::RoundRobin;
use crate::traits::Scheduler;
use pum_core::{Config, SchedulerKind};
use std::sync::Arc;

/// Build the scheduler named by `config.scheduler`, wiring in its
/// plug-in-specific settings from the rest of `config`.
pub fn build(config: &Config) -> Arc<dyn Scheduler> {
    match config.scheduler {
        SchedulerKind::RoundRobin => Arc::new(RoundRobin::new(config.bf_start, config.bf_stop)),
        SchedulerKind::Backfilling => {
            Arc::new(Backfilling::new(config.bf_start, config.bf_stop, config.hwm_percent))
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
