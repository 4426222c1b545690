// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User callbacks (§4.4 `register_callback`): invoked synchronously from the
//! state-handling path. A callback's own failure is isolated — logged, and
//! every other registered callback for the event still runs.

use parking_lot::Mutex;
use std::sync::Arc;

/// The closed set of callback metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    UnitState,
    WaitQueueSize,
}

pum_core::simple_display! {
    Metric {
        UnitState => "UNIT_STATE",
        WaitQueueSize => "WAIT_QUEUE_SIZE",
    }
}

/// What a `UNIT_STATE` callback receives: the unit and its newly observed
/// state.
#[derive(Debug, Clone)]
pub struct UnitStateEvent {
    pub uid: pum_core::UnitId,
    pub state: pum_core::UnitState,
}

type Callback = Arc<dyn Fn(&UnitStateEvent) -> Result<(), String> + Send + Sync>;

/// Registered callbacks for a single metric. Kept separate per metric so a
/// `WAIT_QUEUE_SIZE` registration never fires on a unit-state event.
#[derive(Default)]
pub struct CallbackRegistry {
    unit_state: Mutex<Vec<Callback>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, metric: Metric, cb: F)
    where
        F: Fn(&UnitStateEvent) -> Result<(), String> + Send + Sync + 'static,
    {
        match metric {
            Metric::UnitState => self.unit_state.lock().push(Arc::new(cb)),
            Metric::WaitQueueSize => {
                // no wait-pool exists in this manager (the scheduler owns
                // it); accepted and silently ignored rather than rejected,
                // so callers targeting either metric can register
                // unconditionally. See SPEC_FULL §3a "Callback Metrics —
                // WAIT_QUEUE_SIZE Is Accepted, Never Fired" for why this is
                // a documented gap, not an oversight.
                tracing::debug!("WAIT_QUEUE_SIZE callback registered; this manager never fires it");
            }
        }
    }

    /// Invoke every registered `UNIT_STATE` callback. Must not be called
    /// while holding the units/pilots locks (§5 "Locking discipline").
    ///
    /// Clones the callback list out from under the mutex before invoking
    /// any of them: a callback is foreign code and may call back into
    /// `register`, which would deadlock on this same non-reentrant mutex
    /// if the guard were still held during invocation.
    pub fn fire_unit_state(&self, event: &UnitStateEvent) {
        let callbacks: Vec<Callback> = self.unit_state.lock().clone();
        for cb in &callbacks {
            if let Err(err) = cb(event) {
                tracing::error!(uid = %event.uid, %err, "unit-state callback failed, continuing");
            }
        }
    }
}

#[cfg(test)]
#[path = "callback_tests.rs"]
mod tests;
