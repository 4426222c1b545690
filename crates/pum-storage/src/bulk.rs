// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bulk write batching (§4.2 "Bulking", glossary "Bulk").
//!
//! Updates are appended to a per-collection bulk operation; bulks are
//! flushed when age exceeds `bulk_collection_time` or on an explicit flush.
//! All commands against the same collection share a single open bulk.

use crate::document::{Control, UnitDocument};
use pum_core::{Clock, PilotId, StateObservation, UnitId, UnitState};
use std::time::{Duration, Instant};

/// A single deferred write against the unit collection.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOp {
    InsertUnit(Box<UnitDocument>),
    /// Advance the scalar `state` field and append to history.
    AdvanceState { uid: UnitId, state: UnitState, observation: StateObservation },
    /// Append to history only, without touching the scalar `state` field
    /// (used once a terminal state has been committed, per §4.2 step 2).
    AppendHistoryOnly { uid: UnitId, observation: StateObservation },
    SetControl { uid: UnitId, control: Control },
    /// Record a scheduling decision: the pilot and sandbox a unit was bound
    /// to. A unit is bound at most once; applying this twice for the same
    /// uid is not guarded here (the scheduler's own bound-set is the guard).
    BindPilot { uid: UnitId, pilot: PilotId, sandbox: String },
    DeleteUnit(UnitId),
}

/// An accumulated batch of persistent-store operations, dispatched as one
/// unit of work.
#[derive(Debug, Clone, Default)]
pub struct Bulk {
    pub ops: Vec<BulkOp>,
}

impl Bulk {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

/// Accumulates [`BulkOp`]s for a single collection and decides when to
/// flush: on explicit request, or once the oldest unflushed op has aged
/// past `bulk_collection_time`.
pub struct BulkCollector<C: Clock> {
    clock: C,
    bulk_collection_time: Duration,
    open: parking_lot::Mutex<OpenBulk>,
}

#[derive(Default)]
struct OpenBulk {
    bulk: Bulk,
    opened_at: Option<Instant>,
}

impl<C: Clock> BulkCollector<C> {
    pub fn new(clock: C, bulk_collection_time: Duration) -> Self {
        Self { clock, bulk_collection_time, open: parking_lot::Mutex::new(OpenBulk::default()) }
    }

    /// Append an op to the currently open bulk. Returns `Some(bulk)` if
    /// appending caused the age threshold to be crossed, meaning the caller
    /// should flush immediately (age is checked before the push lands in a
    /// *new* bulk, matching "bulks are flushed when age exceeds... or on an
    /// explicit flush command").
    pub fn push(&self, op: BulkOp) -> Option<Bulk> {
        let mut guard = self.open.lock();
        let now = self.clock.now();
        let aged_out = guard
            .opened_at
            .map(|opened| now.duration_since(opened) >= self.bulk_collection_time)
            .unwrap_or(false);

        let ready = if aged_out {
            let ready = std::mem::take(&mut guard.bulk);
            guard.opened_at = Some(now);
            Some(ready)
        } else {
            None
        };

        if guard.opened_at.is_none() {
            guard.opened_at = Some(now);
        }
        guard.bulk.ops.push(op);
        ready
    }

    /// Force-flush the currently open bulk regardless of age (the `_flush`
    /// command variants in §4.2, and the idle timer in §5).
    pub fn flush(&self) -> Bulk {
        let mut guard = self.open.lock();
        guard.opened_at = None;
        std::mem::take(&mut guard.bulk)
    }

    pub fn is_empty(&self) -> bool {
        self.open.lock().bulk.is_empty()
    }
}

#[cfg(test)]
#[path = "bulk_tests.rs"]
mod tests;
