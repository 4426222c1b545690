// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire/store document shapes (§6 External Interfaces).
//!
//! These are the persisted representations of units and pilots: a superset
//! of the in-memory [`pum_core::Unit`]/[`pum_core::Pilot`] that also carries
//! the manager-ownership bookkeeping (`umgr`, `control`) the store query
//! pattern in §6 depends on.

use pum_core::{Pilot, PilotId, PilotRole, PilotState, StateObservation, Unit, UnitId, UnitState};
use serde::{Deserialize, Serialize};

/// Who currently owns a unit document for the purpose of the unit-pull
/// query pattern in §6: `{type: "unit", umgr, control: "umgr_pending"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    UmgrPending,
    Umgr,
    AgentPending,
    Agent,
}

pum_core::simple_display! {
    Control {
        UmgrPending => "umgr_pending",
        Umgr => "umgr",
        AgentPending => "agent_pending",
        Agent => "agent",
    }
}

/// Persisted unit record. Required fields per §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDocument {
    pub uid: UnitId,
    pub umgr: String,
    pub pilot: Option<PilotId>,
    pub control: Control,
    pub state: UnitState,
    /// Full history, scalar states only (`states` in §6).
    pub states: Vec<UnitState>,
    /// Full history with timestamps (`statehistory` in §6).
    pub statehistory: Vec<StateObservation>,
    pub description: serde_json::Value,
    pub sandbox: Option<String>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub exit_code: Option<i32>,
}

impl UnitDocument {
    pub fn from_unit(unit: &Unit, umgr: impl Into<String>) -> Self {
        Self {
            uid: unit.uid,
            umgr: umgr.into(),
            pilot: unit.pilot,
            control: Control::UmgrPending,
            state: unit.state,
            states: unit.state_history.iter().map(|o| o.state).collect(),
            statehistory: unit.state_history.clone(),
            description: serde_json::to_value(&unit.description).unwrap_or(serde_json::Value::Null),
            sandbox: unit.sandbox.clone(),
            stdout: None,
            stderr: None,
            exit_code: None,
        }
    }
}

/// Persisted pilot record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PilotDocument {
    pub uid: PilotId,
    pub cores: u32,
    pub state: PilotState,
    pub role: PilotRole,
    pub description: serde_json::Value,
}

impl PilotDocument {
    pub fn from_pilot(pilot: &Pilot) -> Self {
        Self {
            uid: pilot.uid,
            cores: pilot.cores,
            state: pilot.state,
            role: pilot.role,
            description: serde_json::to_value(&pilot.description).unwrap_or(serde_json::Value::Null),
        }
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
