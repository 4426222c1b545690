// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The ordered update worker (C2): serializes `UpdateCommand`s into bulk
//! writes against a [`pum_storage::Store`], one [`Linearization`] cache per
//! uid.

use crate::command::{UpdateCommand, UpdateOp};
use crate::error::UpdateError;
use crate::linearize::{Linearization, LinearizeOutcome};
use parking_lot::Mutex;
use pum_core::{Clock, StateObservation, UnitId, UnitState};
use pum_storage::{Bulk, BulkCollector, BulkOp, Store};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

pub struct UpdateWorker<C: Clock, S: Store> {
    store: Arc<S>,
    bulk: BulkCollector<C>,
    cache: Mutex<HashMap<UnitId, Linearization>>,
}

impl<C: Clock, S: Store> UpdateWorker<C, S> {
    pub fn new(clock: C, store: Arc<S>, bulk_collection_time: Duration) -> Self {
        Self { store, bulk: BulkCollector::new(clock, bulk_collection_time), cache: Mutex::new(HashMap::new()) }
    }

    /// Handle one command: translate it to a [`BulkOp`], push it into the
    /// open bulk, and flush if the push aged the bulk out or the command
    /// carried an explicit `_flush`.
    pub fn handle(&self, cmd: UpdateCommand) -> Result<(), UpdateError> {
        let op = self.translate(cmd.uid, cmd.op);

        if let Some(ready) = self.bulk.push(op) {
            self.dispatch(ready)?;
        }
        if cmd.flush {
            self.dispatch(self.bulk.flush())?;
        }
        Ok(())
    }

    fn translate(&self, uid: UnitId, op: UpdateOp) -> BulkOp {
        match op {
            UpdateOp::Insert(doc) => BulkOp::InsertUnit(doc),
            UpdateOp::SetControl(control) => BulkOp::SetControl { uid, control },
            UpdateOp::Delete => BulkOp::DeleteUnit(uid),
            UpdateOp::State { state, timestamp_ms } => self.translate_state(uid, state, timestamp_ms),
        }
    }

    fn translate_state(&self, uid: UnitId, state: UnitState, timestamp_ms: u64) -> BulkOp {
        let observation = StateObservation { state, timestamp_ms };
        let mut cache = self.cache.lock();
        let entry = cache.entry(uid).or_insert_with(|| Linearization::new(UnitState::agent_entry_state()));
        match entry.observe(state) {
            LinearizeOutcome::HistoryOnly => BulkOp::AppendHistoryOnly { uid, observation },
            LinearizeOutcome::Advance(emitted) => BulkOp::AdvanceState { uid, state: emitted, observation },
        }
    }

    /// Idle-timer-driven flush (§5): call periodically even with no new
    /// arrivals, so a bulk aged past the threshold with nothing further
    /// pushed to it still gets dispatched.
    pub fn flush_idle(&self) -> Result<(), UpdateError> {
        self.dispatch(self.bulk.flush())
    }

    fn dispatch(&self, bulk: Bulk) -> Result<(), UpdateError> {
        if bulk.is_empty() {
            return Ok(());
        }
        let len = bulk.len();
        self.store.apply_bulk(bulk).map_err(|err| {
            error!(%err, "update worker: fatal store failure, no retry");
            UpdateError::Fatal(err.to_string())
        })?;
        debug!(ops = len, "update worker: dispatched bulk");
        Ok(())
    }

    /// Drop the linearization cache entry for `uid`. Callers do this once a
    /// unit's lifecycle is known to have ended (session close), to bound
    /// cache growth.
    pub fn forget(&self, uid: &UnitId) {
        self.cache.lock().remove(uid);
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
