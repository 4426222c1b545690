// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pilot: a reservation of cores on a cluster (§3 Data Model).

use crate::state::PilotState;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

crate::define_id! {
    /// Unique identifier for a pilot instance.
    pub struct PilotId("pil-");
}

/// A pilot's membership status in a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PilotRole {
    Added,
    Removed,
}

crate::simple_display! {
    PilotRole {
        Added => "ADDED",
        Removed => "REMOVED",
    }
}

/// Opaque description carried on pilot creation. Only `cores` is required by
/// the core; everything else is application-defined and passed through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PilotDescription {
    pub cores: u32,
    #[serde(default, flatten)]
    pub extensions: HashMap<String, Value>,
}

impl PilotDescription {
    pub fn new(cores: u32) -> Self {
        Self { cores, extensions: HashMap::new() }
    }
}

/// A pilot: a long-lived agent holding a reservation of compute cores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pilot {
    pub uid: PilotId,
    pub cores: u32,
    pub state: PilotState,
    pub role: PilotRole,
    pub description: PilotDescription,
}

impl Pilot {
    pub fn new(uid: PilotId, description: PilotDescription) -> Self {
        Self {
            uid,
            cores: description.cores,
            state: PilotState::PmgrLaunchingPending,
            role: PilotRole::Added,
            description,
        }
    }

    /// Eligible for scheduling iff `start <= state <= stop` (by rank) and the
    /// pilot has not been removed from the scheduler.
    pub fn is_eligible(&self, start: PilotState, stop: PilotState) -> bool {
        self.role == PilotRole::Added && self.state.rank() >= start.rank() && self.state.rank() <= stop.rank()
    }
}

crate::builder! {
    pub struct PilotBuilder => Pilot {
        set {
            uid: PilotId = PilotId::new(),
            cores: u32 = 4,
            state: PilotState = PilotState::PmgrActive,
            role: PilotRole = PilotRole::Added,
            description: PilotDescription = PilotDescription::new(4),
        }
    }
}

#[cfg(test)]
#[path = "pilot_tests.rs"]
mod tests;
