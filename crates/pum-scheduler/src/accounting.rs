// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared scheduler types (§4.3): per-pilot accounting record, the wait-pool
//! entry shape, and the binding a scheduling pass hands back to the caller.

use pum_core::{PilotId, PilotRole, PilotState, UnitId};
use std::collections::HashSet;

/// Input to `add_pilots`: what the scheduler needs to start accounting for
/// a pilot. `state` is the pilot's current lifecycle state at registration
/// time; it is kept current afterwards via `update_pilots`.
#[derive(Debug, Clone)]
pub struct PilotRegistration {
    pub uid: PilotId,
    pub cores: u32,
    pub state: PilotState,
}

/// Derived per-pilot accounting record (§3 Data Model).
#[derive(Debug, Clone)]
pub struct PilotAccounting {
    pub uid: PilotId,
    pub cores: u32,
    pub state: PilotState,
    pub role: PilotRole,
    pub hwm: u32,
    pub used: u32,
    pub units: HashSet<UnitId>,
    pub done: HashSet<UnitId>,
}

impl PilotAccounting {
    pub fn new(registration: PilotRegistration, hwm_percent: u32) -> Self {
        let hwm = registration.cores * hwm_percent / 100;
        Self {
            uid: registration.uid,
            cores: registration.cores,
            state: registration.state,
            role: PilotRole::Added,
            hwm,
            used: 0,
            units: HashSet::new(),
            done: HashSet::new(),
        }
    }

    pub fn is_eligible(&self, start: PilotState, stop: PilotState) -> bool {
        self.role == PilotRole::Added && self.state.rank() >= start.rank() && self.state.rank() <= stop.rank()
    }

    /// Admit `cores_needed` cores onto this pilot's books. Caller has
    /// already checked admissibility; this only performs the mutation and
    /// the P1 non-negativity guard.
    pub fn admit(&mut self, uid: UnitId, cores_needed: u32) -> Result<(), crate::SchedulerError> {
        self.used = self.used.checked_add(cores_needed).ok_or_else(|| {
            let msg = format!("used overflow on pilot {}", self.uid);
            tracing::error!(pilot = %self.uid, uid = %uid, "{msg}");
            crate::SchedulerError::Inconsistent(msg)
        })?;
        self.units.insert(uid);
        Ok(())
    }

    /// Release `uid`'s cores exactly once, guarded by `done` (§4.3 "Release
    /// rule"). A repeat release for the same uid is a no-op.
    pub fn release(&mut self, uid: UnitId, cores: u32) -> Result<(), crate::SchedulerError> {
        if self.done.contains(&uid) {
            return Ok(());
        }
        self.done.insert(uid);
        self.used = self.used.checked_sub(cores).ok_or_else(|| {
            let msg = format!("used would go negative releasing unit {uid} on pilot {}", self.uid);
            tracing::error!(pilot = %self.uid, uid = %uid, "{msg}");
            crate::SchedulerError::Inconsistent(msg)
        })?;
        Ok(())
    }
}

/// A unit waiting to be bound to a pilot.
#[derive(Debug, Clone, Copy)]
pub struct WaitItem {
    pub uid: UnitId,
    pub cores: u32,
}

/// The outcome of binding a unit to a pilot during a scheduling pass.
#[derive(Debug, Clone)]
pub struct Binding {
    pub uid: UnitId,
    pub pilot: PilotId,
    pub sandbox: String,
}

pub(crate) fn sandbox_for(pilot: PilotId, uid: UnitId) -> String {
    format!("{pilot}/{uid}")
}
