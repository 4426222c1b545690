// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent document store contract (§5, §6).
//!
//! Writes are synchronous blocking calls: the update worker and the manager
//! both call through this trait from their own task without spawning a
//! separate I/O task, matching the adapter boundary in §5.

use crate::bulk::{Bulk, BulkOp};
use crate::document::{Control, PilotDocument, UnitDocument};
use crate::error::StoreError;
use parking_lot::Mutex;
use pum_core::{PilotId, UnitId};
use std::collections::HashMap;

/// The persistent-store half of the message fabric adapter (C5).
pub trait Store: Send + Sync {
    fn insert_unit(&self, doc: UnitDocument) -> Result<(), StoreError>;
    fn get_unit(&self, uid: &UnitId) -> Result<UnitDocument, StoreError>;
    fn units_by_umgr(&self, umgr: &str) -> Vec<UnitDocument>;
    /// The unit-pull query pattern: `{type: "unit", umgr, control: "umgr_pending"}`.
    fn units_pending(&self, umgr: &str) -> Vec<UnitDocument>;

    fn insert_pilot(&self, doc: PilotDocument) -> Result<(), StoreError>;
    fn get_pilot(&self, uid: &PilotId) -> Result<PilotDocument, StoreError>;
    fn all_pilots(&self) -> Vec<PilotDocument>;

    /// Apply every op in a bulk as one unit of work. The in-memory
    /// implementation applies ops in order and cannot partially fail; a
    /// real backing store is expected to do the same or report the whole
    /// bulk as [`StoreError::Transient`].
    fn apply_bulk(&self, bulk: Bulk) -> Result<(), StoreError>;
}

/// In-memory [`Store`] backing tests and the reference deployment.
#[derive(Default)]
pub struct InMemoryStore {
    units: Mutex<HashMap<UnitId, UnitDocument>>,
    pilots: Mutex<HashMap<PilotId, PilotDocument>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for InMemoryStore {
    fn insert_unit(&self, doc: UnitDocument) -> Result<(), StoreError> {
        let mut units = self.units.lock();
        if units.contains_key(&doc.uid) {
            tracing::error!(uid = %doc.uid, "insert_unit: uid already present");
            return Err(StoreError::UnitAlreadyExists(doc.uid.to_string()));
        }
        units.insert(doc.uid, doc);
        Ok(())
    }

    fn get_unit(&self, uid: &UnitId) -> Result<UnitDocument, StoreError> {
        self.units.lock().get(uid).cloned().ok_or_else(|| StoreError::UnitNotFound(uid.to_string()))
    }

    fn units_by_umgr(&self, umgr: &str) -> Vec<UnitDocument> {
        self.units.lock().values().filter(|d| d.umgr == umgr).cloned().collect()
    }

    fn units_pending(&self, umgr: &str) -> Vec<UnitDocument> {
        self.units
            .lock()
            .values()
            .filter(|d| d.umgr == umgr && d.control == Control::UmgrPending)
            .cloned()
            .collect()
    }

    fn insert_pilot(&self, doc: PilotDocument) -> Result<(), StoreError> {
        self.pilots.lock().insert(doc.uid, doc);
        Ok(())
    }

    fn get_pilot(&self, uid: &PilotId) -> Result<PilotDocument, StoreError> {
        self.pilots.lock().get(uid).cloned().ok_or_else(|| StoreError::PilotNotFound(uid.to_string()))
    }

    fn all_pilots(&self) -> Vec<PilotDocument> {
        self.pilots.lock().values().cloned().collect()
    }

    fn apply_bulk(&self, bulk: Bulk) -> Result<(), StoreError> {
        let mut units = self.units.lock();
        for op in bulk.ops {
            match op {
                BulkOp::InsertUnit(doc) => {
                    if units.contains_key(&doc.uid) {
                        tracing::error!(uid = %doc.uid, "apply_bulk: InsertUnit uid already present");
                        return Err(StoreError::UnitAlreadyExists(doc.uid.to_string()));
                    }
                    units.insert(doc.uid, *doc);
                }
                BulkOp::AdvanceState { uid, state, observation } => {
                    let doc = units.get_mut(&uid).ok_or_else(|| {
                        tracing::error!(%uid, "apply_bulk: AdvanceState against unknown unit");
                        StoreError::UnitNotFound(uid.to_string())
                    })?;
                    doc.states.push(observation.state);
                    doc.statehistory.push(observation);
                    if !doc.state.is_terminal() {
                        doc.state = state;
                    }
                }
                BulkOp::AppendHistoryOnly { uid, observation } => {
                    let doc = units.get_mut(&uid).ok_or_else(|| {
                        tracing::error!(%uid, "apply_bulk: AppendHistoryOnly against unknown unit");
                        StoreError::UnitNotFound(uid.to_string())
                    })?;
                    doc.states.push(observation.state);
                    doc.statehistory.push(observation);
                }
                BulkOp::SetControl { uid, control } => {
                    let doc = units.get_mut(&uid).ok_or_else(|| {
                        tracing::error!(%uid, "apply_bulk: SetControl against unknown unit");
                        StoreError::UnitNotFound(uid.to_string())
                    })?;
                    doc.control = control;
                }
                BulkOp::BindPilot { uid, pilot, sandbox } => {
                    let doc = units.get_mut(&uid).ok_or_else(|| {
                        tracing::error!(%uid, "apply_bulk: BindPilot against unknown unit");
                        StoreError::UnitNotFound(uid.to_string())
                    })?;
                    if doc.pilot.is_none() {
                        doc.pilot = Some(pilot);
                        doc.sandbox = Some(sandbox);
                    }
                }
                BulkOp::DeleteUnit(uid) => {
                    units.remove(&uid);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
