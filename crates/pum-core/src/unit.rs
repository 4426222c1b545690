// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unit: an executable task (§3 Data Model).

use crate::pilot::PilotId;
use crate::state::{StateObservation, UnitState};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

crate::define_id! {
    /// Unique identifier for a unit instance.
    pub struct UnitId("unt-");
}

/// Opaque description carried on unit submission. Only `cores` is required
/// by the core scheduling algorithms; everything else is application data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitDescription {
    pub cores: u32,
    #[serde(default, flatten)]
    pub extensions: HashMap<String, Value>,
}

impl UnitDescription {
    pub fn new(cores: u32) -> Self {
        Self { cores, extensions: HashMap::new() }
    }
}

/// A unit: an executable task bound to at most one pilot, ever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub uid: UnitId,
    pub description: UnitDescription,
    pub state: UnitState,
    /// Append-only history of observed states with arrival timestamps.
    pub state_history: Vec<StateObservation>,
    /// Bound pilot, unset until scheduled. Once set, never changed.
    pub pilot: Option<PilotId>,
    /// Assigned at scheduling time.
    pub sandbox: Option<String>,
}

impl Unit {
    pub fn new(uid: UnitId, description: UnitDescription, timestamp_ms: u64) -> Self {
        Self {
            uid,
            description,
            state: UnitState::New,
            state_history: vec![StateObservation { state: UnitState::New, timestamp_ms }],
            pilot: None,
            sandbox: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Bind this unit to a pilot and stamp its sandbox path. No-op if
    /// already bound (pilot assignment is immutable once set).
    pub fn bind(&mut self, pilot: PilotId, sandbox: impl Into<String>) {
        if self.pilot.is_none() {
            self.pilot = Some(pilot);
            self.sandbox = Some(sandbox.into());
        }
    }

    /// Record an observed state transition, respecting the terminal-state
    /// invariant: once `state` is terminal, no further transitions are
    /// *applied* to the scalar field, though the observation is still
    /// appended to history by the caller (the update worker, C2, handles
    /// this distinction explicitly; this helper is for direct local
    /// mutation, e.g. the manager's optimistic cancel).
    pub fn advance(&mut self, state: UnitState, timestamp_ms: u64) {
        self.state_history.push(StateObservation { state, timestamp_ms });
        if !self.state.is_terminal() {
            self.state = state;
        }
    }
}

crate::builder! {
    pub struct UnitBuilder => Unit {
        set {
            uid: UnitId = UnitId::new(),
            description: UnitDescription = UnitDescription::new(1),
            state: UnitState = UnitState::New,
            state_history: Vec<StateObservation> = vec![StateObservation { state: UnitState::New, timestamp_ms: 0 }],
            pilot: Option<PilotId> = None,
            sandbox: Option<String> = None,
        }
    }
}

#[cfg(test)]
#[path = "unit_tests.rs"]
mod tests;
