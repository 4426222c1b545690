// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration record (§6 "Configuration", §9 "Global state").
//!
//! Collects what the original implementation scattered across environment
//! variable overrides (HWM, start/stop states, strict-cancel) into a single
//! record constructed at startup and threaded through as a parameter.

use crate::state::PilotState;
use serde::{Deserialize, Serialize};

/// The scheduler plug-in to bind a [`crate::UnitManager`]-equivalent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerKind {
    RoundRobin,
    Backfilling,
}

crate::simple_display! {
    SchedulerKind {
        RoundRobin => "round_robin",
        Backfilling => "backfilling",
    }
}

/// Default high-water mark percentage for the backfilling scheduler.
pub const DEFAULT_HWM_PERCENT: u32 = 200;

/// Configuration for a unit manager and the components it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub scheduler: SchedulerKind,
    /// Seconds between the manager's background pulls.
    pub db_poll_sleeptime_secs: f64,
    /// Seconds the update worker accumulates a bulk before flushing.
    pub bulk_collection_time_secs: f64,
    /// When set, `cancel_units` defers the local optimistic state set and
    /// relies solely on the downstream control-bus round trip.
    pub strict_cancel: bool,
    /// Backfilling only: percentage of pilot cores schedulable as unfinished
    /// work; >100 permits oversubscription.
    pub hwm_percent: u32,
    /// Backfilling only: pilot state range eligible for scheduling.
    pub bf_start: PilotState,
    pub bf_stop: PilotState,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheduler: SchedulerKind::RoundRobin,
            db_poll_sleeptime_secs: 1.0,
            bulk_collection_time_secs: 1.0,
            strict_cancel: false,
            hwm_percent: DEFAULT_HWM_PERCENT,
            bf_start: PilotState::PmgrActive,
            bf_stop: PilotState::PmgrActive,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

pub struct ConfigBuilder {
    inner: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self { inner: Config::default() }
    }
}

impl ConfigBuilder {
    pub fn scheduler(mut self, scheduler: SchedulerKind) -> Self {
        self.inner.scheduler = scheduler;
        self
    }

    pub fn db_poll_sleeptime_secs(mut self, secs: f64) -> Self {
        self.inner.db_poll_sleeptime_secs = secs;
        self
    }

    pub fn bulk_collection_time_secs(mut self, secs: f64) -> Self {
        self.inner.bulk_collection_time_secs = secs;
        self
    }

    pub fn strict_cancel(mut self, strict: bool) -> Self {
        self.inner.strict_cancel = strict;
        self
    }

    pub fn hwm_percent(mut self, percent: u32) -> Self {
        self.inner.hwm_percent = percent;
        self
    }

    pub fn bf_start(mut self, state: PilotState) -> Self {
        self.inner.bf_start = state;
        self
    }

    pub fn bf_stop(mut self, state: PilotState) -> Self {
        self.inner.bf_stop = state;
        self
    }

    pub fn build(self) -> Config {
        self.inner
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
