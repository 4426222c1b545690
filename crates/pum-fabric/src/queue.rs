// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named output queues (§6): `UMGR_SCHEDULING_PENDING`,
//! `UMGR_STAGING_OUTPUT_PENDING`. Carry full unit-document snapshots.

use crate::error::FabricError;
use parking_lot::Mutex;
use pum_core::UnitState;
use pum_storage::UnitDocument;
use std::collections::HashMap;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputQueue {
    SchedulingPending,
    StagingOutputPending,
}

pum_core::simple_display! {
    OutputQueue {
        SchedulingPending => "UMGR_SCHEDULING_PENDING",
        StagingOutputPending => "UMGR_STAGING_OUTPUT_PENDING",
    }
}

/// Owns the sending half of every created output queue and the
/// state-to-queue routing table declared via `register_output`.
#[derive(Default)]
pub struct OutputQueues {
    senders: Mutex<HashMap<OutputQueue, mpsc::UnboundedSender<UnitDocument>>>,
    routes: Mutex<HashMap<UnitState, OutputQueue>>,
}

impl OutputQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a named queue, returning the consumer's receiving half.
    /// Recreating an already-created queue replaces its sender (and drops
    /// the previous receiver's feed); callers normally do this once at
    /// construction.
    pub fn create(&self, queue: OutputQueue) -> mpsc::UnboundedReceiver<UnitDocument> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.lock().insert(queue, tx);
        rx
    }

    /// Declare that transitions into `state` enqueue onto `queue`.
    pub fn register_output(&self, state: UnitState, queue: OutputQueue) {
        self.routes.lock().insert(state, queue);
    }

    /// Push `doc` onto the queue registered for `doc.state`, if any. Not
    /// every state has a declared output queue; that is not an error.
    pub fn push(&self, doc: UnitDocument) -> Result<(), FabricError> {
        let Some(queue) = self.routes.lock().get(&doc.state).copied() else {
            return Ok(());
        };
        let senders = self.senders.lock();
        let sender = senders.get(&queue).ok_or_else(|| FabricError::UnregisteredOutput(queue.to_string()))?;
        let _ = sender.send(doc);
        Ok(())
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
