// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State model (C1): the total order over unit/pilot states and the
//! collapse rule over observed histories.
//!
//! State events arrive from multiple sources (the pilot-agent, the update
//! worker, local mutations) out of order over different transports. Clients
//! must see a monotone, non-regressing view; [`collapse`] is what guarantees
//! that.

use serde::{Deserialize, Serialize};

/// Pilot lifecycle state (partial order, monotone).
///
/// `PMGR_LAUNCHING_PENDING < PMGR_LAUNCHING < PMGR_ACTIVE_PENDING <
/// PMGR_ACTIVE < {DONE, FAILED, CANCELED}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PilotState {
    PmgrLaunchingPending,
    PmgrLaunching,
    PmgrActivePending,
    PmgrActive,
    Done,
    Failed,
    Canceled,
}

crate::simple_display! {
    PilotState {
        PmgrLaunchingPending => "PMGR_LAUNCHING_PENDING",
        PmgrLaunching => "PMGR_LAUNCHING",
        PmgrActivePending => "PMGR_ACTIVE_PENDING",
        PmgrActive => "PMGR_ACTIVE",
        Done => "DONE",
        Failed => "FAILED",
        Canceled => "CANCELED",
    }
}

impl PilotState {
    /// Dense integer rank in the pilot state order. The three terminal
    /// states share the top rank: they are mutually unordered, all reachable
    /// from `PMGR_ACTIVE`.
    pub fn rank(self) -> u8 {
        match self {
            PilotState::PmgrLaunchingPending => 0,
            PilotState::PmgrLaunching => 1,
            PilotState::PmgrActivePending => 2,
            PilotState::PmgrActive => 3,
            PilotState::Done | PilotState::Failed | PilotState::Canceled => 4,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PilotState::Done | PilotState::Failed | PilotState::Canceled)
    }
}

/// Unit lifecycle state (total order, used for linearization by C2).
///
/// Encoded as a fixed, extensible enumeration with a bijection to integer
/// ranks, per spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitState {
    New,
    Pending,
    PendingLaunch,
    Launching,
    PendingActive,
    Active,
    Unscheduled,
    Scheduling,
    PendingInputStaging,
    StagingInput,
    AgentStagingInputPending,
    AgentStagingInput,
    AllocatingPending,
    Allocating,
    ExecutingPending,
    Executing,
    AgentStagingOutputPending,
    AgentStagingOutput,
    PendingOutputStaging,
    StagingOutput,
    /// Cancellation requested but not yet observed terminal; ranks above
    /// every other non-terminal state but is *not* itself in the closed
    /// terminal set (see [`is_terminal`]).
    Canceling,
    Done,
    Canceled,
    Failed,
}

crate::simple_display! {
    UnitState {
        New => "NEW",
        Pending => "PENDING",
        PendingLaunch => "PENDING_LAUNCH",
        Launching => "LAUNCHING",
        PendingActive => "PENDING_ACTIVE",
        Active => "ACTIVE",
        Unscheduled => "UNSCHEDULED",
        Scheduling => "SCHEDULING",
        PendingInputStaging => "PENDING_INPUT_STAGING",
        StagingInput => "STAGING_INPUT",
        AgentStagingInputPending => "AGENT_STAGING_INPUT_PENDING",
        AgentStagingInput => "AGENT_STAGING_INPUT",
        AllocatingPending => "ALLOCATING_PENDING",
        Allocating => "ALLOCATING",
        ExecutingPending => "EXECUTING_PENDING",
        Executing => "EXECUTING",
        AgentStagingOutputPending => "AGENT_STAGING_OUTPUT_PENDING",
        AgentStagingOutput => "AGENT_STAGING_OUTPUT",
        PendingOutputStaging => "PENDING_OUTPUT_STAGING",
        StagingOutput => "STAGING_OUTPUT",
        Canceling => "CANCELING",
        Done => "DONE",
        Canceled => "CANCELED",
        Failed => "FAILED",
    }
}

/// All non-terminal unit states in ascending rank order. The index in this
/// slice *is* the rank, which is how [`rank`] and [`UnitState::from_rank`]
/// stay a bijection without hand-maintaining two tables.
const UNIT_STATE_ORDER: &[UnitState] = &[
    UnitState::New,
    UnitState::Pending,
    UnitState::PendingLaunch,
    UnitState::Launching,
    UnitState::PendingActive,
    UnitState::Active,
    UnitState::Unscheduled,
    UnitState::Scheduling,
    UnitState::PendingInputStaging,
    UnitState::StagingInput,
    UnitState::AgentStagingInputPending,
    UnitState::AgentStagingInput,
    UnitState::AllocatingPending,
    UnitState::Allocating,
    UnitState::ExecutingPending,
    UnitState::Executing,
    UnitState::AgentStagingOutputPending,
    UnitState::AgentStagingOutput,
    UnitState::PendingOutputStaging,
    UnitState::StagingOutput,
    UnitState::Canceling,
];

impl UnitState {
    /// Dense integer rank in the total order. Terminal states all rank past
    /// every non-terminal state; they are distinguished from one another
    /// only by [`collapse`]'s "first terminal wins" rule, not by rank order.
    pub fn rank(self) -> u32 {
        if let Some(pos) = UNIT_STATE_ORDER.iter().position(|s| *s == self) {
            return pos as u32;
        }
        UNIT_STATE_ORDER.len() as u32
    }

    pub fn from_rank(rank: u32) -> Option<UnitState> {
        UNIT_STATE_ORDER.get(rank as usize).copied()
    }

    pub fn is_terminal(self) -> bool {
        is_terminal(self)
    }

    /// The unit state the agent-side update stream starts reporting from.
    pub fn agent_entry_state() -> UnitState {
        UnitState::AgentStagingInputPending
    }

    pub fn agent_executing() -> UnitState {
        UnitState::Executing
    }
}

/// `rank(state) -> int`: dense integer rank in the total order.
pub fn rank(state: UnitState) -> u32 {
    state.rank()
}

/// `is_terminal(state) -> bool`: true for {DONE, FAILED, CANCELED}.
pub fn is_terminal(state: UnitState) -> bool {
    matches!(state, UnitState::Done | UnitState::Failed | UnitState::Canceled)
}

/// A single observed state with its arrival timestamp (epoch milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateObservation {
    pub state: UnitState,
    pub timestamp_ms: u64,
}

/// `collapse(history) -> state`: given an append-only list of observed
/// states, returns the *effective* state.
///
/// Rule: if any terminal state appears, return the *first* terminal
/// encountered; otherwise return the state with maximum rank. Ties (same
/// rank) break by first occurrence. Deterministic and idempotent (P2).
pub fn collapse(history: &[UnitState]) -> Option<UnitState> {
    if let Some(first_terminal) = history.iter().find(|s| is_terminal(**s)) {
        return Some(*first_terminal);
    }

    first_occurrence_of_max_rank(history.iter().copied())
}

/// `collapse` over timestamped observations, for callers that keep full
/// history records rather than a bare state list.
pub fn collapse_observations(history: &[StateObservation]) -> Option<UnitState> {
    if let Some(first_terminal) = history.iter().find(|o| is_terminal(o.state)) {
        return Some(first_terminal.state);
    }

    first_occurrence_of_max_rank(history.iter().map(|o| o.state))
}

/// Like `Iterator::max_by_key`, but ties keep the *first* occurrence rather
/// than the last — `Iterator::max_by_key` does the opposite, which would
/// violate the spec's tie-break rule.
fn first_occurrence_of_max_rank(states: impl Iterator<Item = UnitState>) -> Option<UnitState> {
    let mut best: Option<(u32, UnitState)> = None;
    for s in states {
        let r = rank(s);
        match best {
            Some((best_rank, _)) if r <= best_rank => {}
            _ => best = Some((r, s)),
        }
    }
    best.map(|(_, s)| s)
}

impl std::str::FromStr for UnitState {
    type Err = crate::error::PumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UNIT_STATE_ORDER
            .iter()
            .chain([UnitState::Done, UnitState::Canceling, UnitState::Canceled, UnitState::Failed]
                .iter())
            .find(|state| state.to_string() == s)
            .copied()
            .ok_or_else(|| crate::error::PumError::UnknownUnitState(s.to_string()))
    }
}

impl std::str::FromStr for PilotState {
    type Err = crate::error::PumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            PilotState::PmgrLaunchingPending,
            PilotState::PmgrLaunching,
            PilotState::PmgrActivePending,
            PilotState::PmgrActive,
            PilotState::Done,
            PilotState::Failed,
            PilotState::Canceled,
        ]
        .into_iter()
        .find(|state| state.to_string() == s)
        .ok_or_else(|| crate::error::PumError::UnknownPilotState(s.to_string()))
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
