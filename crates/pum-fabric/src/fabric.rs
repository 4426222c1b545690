// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The message fabric adapter (C5, §4.5): a thin contract combining the
//! CONTROL/STATE pub/sub topics with the output-queue registry and the
//! atomic `advance` operation over the persistent store.

use crate::error::FabricError;
use crate::message::{ControlMessage, EntityKind, StateMessage};
use crate::queue::{OutputQueue, OutputQueues};
use crate::topic::Topic;
use pum_core::{UnitId, UnitState};
use pum_storage::{Bulk, BulkOp, Store};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

pub struct Fabric<S: Store> {
    control: Topic<ControlMessage>,
    state: Topic<StateMessage>,
    outputs: OutputQueues,
    store: Arc<S>,
}

impl<S: Store> Fabric<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { control: Topic::new(), state: Topic::new(), outputs: OutputQueues::new(), store }
    }

    pub fn publish_control(&self, message: ControlMessage) {
        self.control.publish(message);
    }

    pub fn subscribe_control<F>(&self, handler: F)
    where
        F: Fn(ControlMessage) + Send + Sync + 'static,
    {
        self.control.subscribe(handler);
    }

    pub fn publish_state(&self, message: StateMessage) {
        self.state.publish(message);
    }

    pub fn subscribe_state<F>(&self, handler: F)
    where
        F: Fn(StateMessage) + Send + Sync + 'static,
    {
        self.state.subscribe(handler);
    }

    pub fn create_output_queue(&self, queue: OutputQueue) -> mpsc::UnboundedReceiver<pum_storage::UnitDocument> {
        self.outputs.create(queue)
    }

    pub fn register_output(&self, state: UnitState, queue: OutputQueue) {
        self.outputs.register_output(state, queue);
    }

    /// Atomic transition: optionally commit `new_state` to the store
    /// (respecting the terminal latch, §4.1), optionally publish the
    /// resulting state on the STATE topic, optionally push the resulting
    /// document into whatever output queue is registered for its state.
    pub fn advance(
        &self,
        uids: &[UnitId],
        new_state: Option<UnitState>,
        timestamp_ms: u64,
        publish: bool,
        push: bool,
    ) -> Result<(), FabricError> {
        for &uid in uids {
            if let Some(state) = new_state {
                let observation = pum_core::StateObservation { state, timestamp_ms };
                let bulk = Bulk { ops: vec![BulkOp::AdvanceState { uid, state, observation }] };
                self.store.apply_bulk(bulk)?;
            }

            let doc = match self.store.get_unit(&uid) {
                Ok(doc) => doc,
                Err(err) => {
                    warn!(%uid, %err, "advance: unit vanished from store mid-transition");
                    continue;
                }
            };

            if publish {
                self.state.publish(StateMessage {
                    kind: EntityKind::Unit,
                    uid: uid.to_string(),
                    state: doc.state.to_string(),
                    timestamp_ms,
                });
            }
            if push {
                self.outputs.push(doc)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fabric_tests.rs"]
mod tests;
