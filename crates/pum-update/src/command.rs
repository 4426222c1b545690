// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker input contract (§4.2): `(cmd, thing)` pairs, each with a `_flush`
//! variant forcing immediate dispatch.

use pum_core::{UnitId, UnitState};
use pum_storage::{Control, UnitDocument};

#[derive(Debug, Clone)]
pub enum UpdateOp {
    Insert(Box<UnitDocument>),
    SetControl(Control),
    Delete,
    State { state: UnitState, timestamp_ms: u64 },
}

#[derive(Debug, Clone)]
pub struct UpdateCommand {
    pub uid: UnitId,
    pub op: UpdateOp,
    /// The `_flush` suffix on a command: force the bulk open for this
    /// collection to dispatch immediately after this op lands in it.
    pub flush: bool,
}

impl UpdateCommand {
    pub fn insert(doc: UnitDocument, flush: bool) -> Self {
        Self { uid: doc.uid, op: UpdateOp::Insert(Box::new(doc)), flush }
    }

    pub fn set_control(uid: UnitId, control: Control, flush: bool) -> Self {
        Self { uid, op: UpdateOp::SetControl(control), flush }
    }

    pub fn delete(uid: UnitId, flush: bool) -> Self {
        Self { uid, op: UpdateOp::Delete, flush }
    }

    pub fn state(uid: UnitId, state: UnitState, timestamp_ms: u64, flush: bool) -> Self {
        Self { uid, op: UpdateOp::State { state, timestamp_ms }, flush }
    }
}
