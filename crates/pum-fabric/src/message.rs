// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire shapes for the CONTROL and STATE topics (§6 External Interfaces).

use pum_core::{PilotDescription, PilotId, UnitId};
use serde::{Deserialize, Serialize};

/// CONTROL topic payload: `{cmd: string, arg: object}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "arg", rename_all = "snake_case")]
pub enum ControlMessage {
    AddPilots { pilots: Vec<PilotDescription>, umgr: String },
    RemovePilots { pids: Vec<PilotId>, umgr: String },
    CancelUnits { uids: Vec<UnitId> },
}

/// What kind of entity a STATE message reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Unit,
    Pilot,
}

/// STATE topic payload: `{type, uid, state, ...}`. Subscribers MUST ignore
/// messages whose `kind` they don't recognize rather than error (§6).
///
/// `state` is the wire string form (`UnitState`/`PilotState`'s `Display`),
/// not a typed enum: the bus carries both unit and pilot observations on
/// the same topic and must not reject a kind it doesn't recognize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateMessage {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub uid: String,
    pub state: String,
    pub timestamp_ms: u64,
}
