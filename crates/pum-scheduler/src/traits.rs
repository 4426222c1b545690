// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shared scheduler contract (§4.3).

use crate::accounting::{Binding, PilotRegistration, WaitItem};
use crate::error::SchedulerError;
use pum_core::{PilotId, PilotState, UnitId, UnitState};

/// A unit-to-pilot placement policy. Implementations are `Send + Sync`:
/// the manager drives `work`/`update_pilots`/`update_units` from
/// independently scheduled tasks (§5).
pub trait Scheduler: Send + Sync {
    /// Register new pilots; may trigger a scheduling pass over the wait
    /// pool. Returns bindings made as a result.
    fn add_pilots(&self, pilots: Vec<PilotRegistration>) -> Result<Vec<Binding>, SchedulerError>;

    /// Deregister pilots. Units already bound to them stay bound (no
    /// migration); fails with `UnknownPilot` for any uid not registered.
    fn remove_pilots(&self, pids: &[PilotId]) -> Result<(), SchedulerError>;

    /// Re-evaluate eligibility after a pilot's lifecycle state changes; may
    /// trigger a scheduling pass.
    fn update_pilots(&self, pid: PilotId, state: PilotState) -> Result<Vec<Binding>, SchedulerError>;

    /// Observe a batch of unit-state changes, releasing accounting for any
    /// unit that has passed `AGENT_EXECUTING` (§4.3 "Release rule"). All
    /// releases in the batch land before the resulting scheduling pass
    /// runs, so a batch of releases can free capacity for more than one
    /// newly admitted waiter.
    fn update_units(&self, updates: &[(UnitId, UnitState)]) -> Result<Vec<Binding>, SchedulerError>;

    /// Ingest newly submitted units and attempt to place them.
    fn work(&self, units: Vec<WaitItem>) -> Result<Vec<Binding>, SchedulerError>;
}
