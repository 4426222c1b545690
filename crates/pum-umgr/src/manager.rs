// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The unit manager (C4, §4.4): owns the submitted-unit lifecycle end to
//! end, wiring the message fabric (C5), a [`Scheduler`] plug-in (C3), and
//! the background pulls that keep the in-memory mirror current.

use crate::callback::{CallbackRegistry, Metric, UnitStateEvent};
use crate::error::UmgrError;
use crate::ids::UmgrId;
use parking_lot::{Mutex, RwLock};
use pum_core::{Clock, Pilot, PilotDescription, PilotId, PilotState, Unit, UnitDescription, UnitId, UnitState};
use pum_fabric::{ControlMessage, EntityKind, Fabric, OutputQueue, StateMessage};
use pum_scheduler::{Binding, PilotRegistration, Scheduler, WaitItem};
use pum_storage::{Bulk, BulkOp, Control, PilotDocument, Store, UnitDocument};
use pum_update::UpdateWorker;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::error;

/// A pilot to register: caller-assigned uid plus description, matching
/// `add_pilots(pilots)` in §4.4 (the wire `AddPilots` message carries bare
/// descriptions, but the manager needs a stable uid to track the pilot by
/// before any round trip through the control bus completes).
#[derive(Debug, Clone)]
pub struct PilotSpec {
    pub uid: PilotId,
    pub description: PilotDescription,
}

/// Owns a submitted-unit population end to end: admission, scheduling,
/// state reconciliation, and cancellation, bound to one session and one
/// scheduler plug-in.
pub struct UnitManager<C: Clock, S: Store + 'static> {
    umgr: UmgrId,
    config: pum_core::Config,
    clock: C,
    store: Arc<S>,
    fabric: Arc<Fabric<S>>,
    scheduler: Arc<dyn Scheduler>,
    update_worker: Arc<UpdateWorker<C, S>>,
    units: RwLock<HashMap<UnitId, Unit>>,
    pilots: RwLock<HashMap<PilotId, Pilot>>,
    callbacks: CallbackRegistry,
    closed: AtomicBool,
    staging_output_rx: Mutex<Option<mpsc::UnboundedReceiver<UnitDocument>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<C: Clock, S: Store + 'static> UnitManager<C, S> {
    /// Construct a manager bound to `umgr`, wiring its output routes and
    /// spawning its background pulls and scheduling driver (§4.4
    /// "Construction", §5 "parallel tasks").
    pub fn new(umgr: UmgrId, config: pum_core::Config, clock: C, store: Arc<S>, scheduler: Arc<dyn Scheduler>) -> Arc<Self> {
        let fabric = Arc::new(Fabric::new(Arc::clone(&store)));
        fabric.register_output(UnitState::Scheduling, OutputQueue::SchedulingPending);
        fabric.register_output(UnitState::AgentStagingOutputPending, OutputQueue::StagingOutputPending);
        let scheduling_rx = fabric.create_output_queue(OutputQueue::SchedulingPending);
        let staging_rx = fabric.create_output_queue(OutputQueue::StagingOutputPending);

        let update_worker = Arc::new(UpdateWorker::new(
            clock.clone(),
            Arc::clone(&store),
            Duration::from_secs_f64(config.bulk_collection_time_secs.max(0.001)),
        ));

        let mgr = Arc::new(Self {
            umgr,
            config,
            clock,
            store,
            fabric,
            scheduler,
            update_worker,
            units: RwLock::new(HashMap::new()),
            pilots: RwLock::new(HashMap::new()),
            callbacks: CallbackRegistry::new(),
            closed: AtomicBool::new(false),
            staging_output_rx: Mutex::new(Some(staging_rx)),
            tasks: Mutex::new(Vec::new()),
        });

        {
            let mgr = Arc::clone(&mgr);
            mgr.fabric.subscribe_state(move |msg| mgr.on_state_message(msg));
        }
        mgr.spawn_pulls();
        mgr.spawn_scheduling_driver(scheduling_rx);

        mgr
    }

    pub fn umgr_id(&self) -> UmgrId {
        self.umgr
    }

    pub fn update_worker(&self) -> &Arc<UpdateWorker<C, S>> {
        &self.update_worker
    }

    /// The `UMGR_STAGING_OUTPUT_PENDING` queue's receiving half. Takes it
    /// exactly once; later calls return `None`. This manager only drains
    /// the scheduling-pending queue itself (§4.4): the staging-output queue
    /// is the hand-off point to whatever downstream consumes finished
    /// units, so it is exposed rather than drained internally.
    pub fn take_staging_output_receiver(&self) -> Option<mpsc::UnboundedReceiver<UnitDocument>> {
        self.staging_output_rx.lock().take()
    }

    // ---- pilots -----------------------------------------------------

    pub fn add_pilots(&self, specs: Vec<PilotSpec>) -> Result<(), UmgrError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(UmgrError::Closed);
        }
        if specs.is_empty() {
            return Err(UmgrError::EmptyPilotList);
        }
        {
            let pilots = self.pilots.read();
            for spec in &specs {
                if pilots.contains_key(&spec.uid) {
                    return Err(UmgrError::PilotAlreadyAdded(spec.uid.to_string()));
                }
            }
        }

        let minted: Vec<Pilot> = specs.iter().map(|s| Pilot::new(s.uid, s.description.clone())).collect();
        for pilot in &minted {
            self.store.insert_pilot(PilotDocument::from_pilot(pilot))?;
        }

        let registrations: Vec<PilotRegistration> =
            minted.iter().map(|p| PilotRegistration { uid: p.uid, cores: p.cores, state: p.state }).collect();
        let bindings = self.scheduler.add_pilots(registrations)?;

        {
            let mut pilots = self.pilots.write();
            for pilot in minted {
                pilots.insert(pilot.uid, pilot);
            }
        }
        for binding in bindings {
            self.apply_binding(binding);
        }

        self.fabric.publish_control(ControlMessage::AddPilots {
            pilots: specs.into_iter().map(|s| s.description).collect(),
            umgr: self.umgr.to_string(),
        });
        Ok(())
    }

    /// `drain` is rejected unconditionally (§4.4: "MUST be rejected as
    /// unimplemented"). Local removal is synchronous; scheduler-side
    /// removal failures are logged rather than surfaced, matching "pilots
    /// removed asynchronously from the scheduler" (§4.4).
    pub fn remove_pilots(&self, pids: &[PilotId], drain: bool) -> Result<(), UmgrError> {
        if drain {
            return Err(UmgrError::DrainUnsupported);
        }
        if self.closed.load(Ordering::Acquire) {
            return Err(UmgrError::Closed);
        }
        {
            let pilots = self.pilots.read();
            for pid in pids {
                if !pilots.contains_key(pid) {
                    return Err(UmgrError::UnknownPilot(pid.to_string()));
                }
            }
        }

        {
            let mut pilots = self.pilots.write();
            for pid in pids {
                pilots.remove(pid);
            }
        }

        if let Err(err) = self.scheduler.remove_pilots(pids) {
            error!(%err, "remove_pilots: scheduler-side removal failed, local state already updated");
        }
        self.fabric.publish_control(ControlMessage::RemovePilots { pids: pids.to_vec(), umgr: self.umgr.to_string() });
        Ok(())
    }

    pub fn list_pilots(&self) -> Vec<Pilot> {
        self.pilots.read().values().cloned().collect()
    }

    pub fn get_pilots(&self, uids: &[PilotId]) -> Result<Vec<Pilot>, UmgrError> {
        let pilots = self.pilots.read();
        uids.iter()
            .map(|uid| pilots.get(uid).cloned().ok_or_else(|| UmgrError::UnknownPilot(uid.to_string())))
            .collect()
    }

    // ---- units --------------------------------------------------------

    pub fn list_units(&self) -> Vec<Unit> {
        self.units.read().values().cloned().collect()
    }

    pub fn get_units(&self, uids: Option<&[UnitId]>) -> Result<Vec<Unit>, UmgrError> {
        match uids {
            None => Ok(self.list_units()),
            Some(ids) => {
                let units = self.units.read();
                ids.iter()
                    .map(|uid| units.get(uid).cloned().ok_or_else(|| UmgrError::UnknownUnit(uid.to_string())))
                    .collect()
            }
        }
    }

    /// Mint a uid per descriptor, persist, and advance every unit to
    /// `SCHEDULING` (§4.4: this is what routes them into
    /// `UMGR_SCHEDULING_PENDING`, §6 "Output queues").
    pub fn submit_units(&self, descrs: Vec<UnitDescription>) -> Result<Vec<UnitId>, UmgrError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(UmgrError::Closed);
        }
        if descrs.is_empty() {
            return Ok(Vec::new());
        }

        let now = self.clock.epoch_ms();
        let minted: Vec<Unit> = descrs.into_iter().map(|d| Unit::new(UnitId::new(), d, now)).collect();
        let uids: Vec<UnitId> = minted.iter().map(|u| u.uid).collect();

        {
            let mut units = self.units.write();
            for unit in &minted {
                units.insert(unit.uid, unit.clone());
            }
        }

        let ops = minted.iter().map(|u| BulkOp::InsertUnit(Box::new(UnitDocument::from_unit(u, self.umgr.to_string())))).collect();
        self.store.apply_bulk(Bulk { ops })?;

        self.fabric.advance(&uids, Some(UnitState::Scheduling), now, true, true)?;
        {
            let mut units = self.units.write();
            for uid in &uids {
                if let Some(unit) = units.get_mut(uid) {
                    unit.advance(UnitState::Scheduling, now);
                }
            }
        }

        Ok(uids)
    }

    pub fn submit_unit(&self, descr: UnitDescription) -> Result<UnitId, UmgrError> {
        self.submit_units(vec![descr])?.into_iter().next().ok_or_else(|| UmgrError::Store("submit_unit: no uid minted".into()))
    }

    /// Poll the in-memory mirror at 100ms cadence until every target unit
    /// reaches `state` (terminal, if unspecified). `uids: None` targets only
    /// units that were not already terminal at call time (§9 Open
    /// Questions). A finite `timeout` returns the current snapshot on
    /// expiry rather than erroring; `close()` also wakes a pending wait.
    pub async fn wait_units(&self, uids: Option<Vec<UnitId>>, state: Option<UnitState>, timeout: Option<Duration>) -> Result<Vec<Unit>, UmgrError> {
        let targets = match uids {
            Some(ids) => {
                let units = self.units.read();
                for id in &ids {
                    if !units.contains_key(id) {
                        return Err(UmgrError::UnknownUnit(id.to_string()));
                    }
                }
                ids
            }
            None => {
                let units = self.units.read();
                units.values().filter(|u| !u.is_terminal()).map(|u| u.uid).collect()
            }
        };

        let deadline = timeout.map(|d| tokio::time::Instant::now() + d);
        loop {
            let snapshot: Vec<Unit> = {
                let units = self.units.read();
                targets.iter().filter_map(|id| units.get(id).cloned()).collect()
            };
            let satisfied = snapshot.iter().all(|u| match state {
                Some(want) => u.state == want,
                None => u.is_terminal(),
            });
            if satisfied || self.closed.load(Ordering::Acquire) {
                return Ok(snapshot);
            }
            if let Some(dl) = deadline {
                if tokio::time::Instant::now() >= dl {
                    return Ok(snapshot);
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    pub async fn wait_unit(&self, uid: UnitId, state: Option<UnitState>, timeout: Option<Duration>) -> Result<Unit, UmgrError> {
        self.wait_units(Some(vec![uid]), state, timeout)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| UmgrError::UnknownUnit(uid.to_string()))
    }

    /// Optimistic by default: advances targets to `CANCELED` locally before
    /// the control-bus round trip settles, then waits for that settlement.
    /// `strict_cancel` skips only the local optimistic advance; the
    /// control-bus message is always published (§9 Open Questions). Units
    /// may race past `CANCELED` to a terminal state reported first by the
    /// agent (§4.4 "accepted").
    pub async fn cancel_units(&self, uids: Option<Vec<UnitId>>) -> Result<Vec<Unit>, UmgrError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(UmgrError::Closed);
        }
        let targets = match uids {
            Some(ids) => {
                let units = self.units.read();
                for id in &ids {
                    if !units.contains_key(id) {
                        return Err(UmgrError::UnknownUnit(id.to_string()));
                    }
                }
                ids
            }
            None => self.units.read().keys().copied().collect(),
        };

        if !self.config.strict_cancel {
            let now = self.clock.epoch_ms();
            self.fabric.advance(&targets, Some(UnitState::Canceled), now, true, true)?;
            let mut units = self.units.write();
            for id in &targets {
                if let Some(unit) = units.get_mut(id) {
                    unit.advance(UnitState::Canceled, now);
                }
            }
        }

        self.fabric.publish_control(ControlMessage::CancelUnits { uids: targets.clone() });
        self.wait_units(Some(targets), None, None).await
    }

    pub async fn cancel_unit(&self, uid: UnitId) -> Result<Unit, UmgrError> {
        self.cancel_units(Some(vec![uid]))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| UmgrError::UnknownUnit(uid.to_string()))
    }

    pub fn register_callback<F>(&self, metric: Metric, cb: F)
    where
        F: Fn(&UnitStateEvent) -> Result<(), String> + Send + Sync + 'static,
    {
        self.callbacks.register(metric, cb);
    }

    /// Idempotent: sets the terminate flag (which also wakes any pending
    /// `wait_units`) and aborts the background tasks. Does not cancel any
    /// unit (§4.4 "Close").
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        for handle in self.tasks.lock().drain(..) {
            handle.abort();
        }
    }

    // ---- background pulls ---------------------------------------------

    /// State-pull (§4.4): compare the stored state of every unit this
    /// manager owns against the local mirror, updating and firing
    /// `UNIT_STATE` callbacks for anything that moved. Returns whether any
    /// unit actually changed.
    pub fn state_pull(&self) -> bool {
        let docs = self.store.units_by_umgr(self.umgr.as_str());
        let mut changed = Vec::new();
        {
            let mut units = self.units.write();
            for doc in &docs {
                if let Some(local) = units.get_mut(&doc.uid) {
                    if local.state != doc.state {
                        local.state = doc.state;
                        local.state_history = doc.statehistory.clone();
                        changed.push(UnitStateEvent { uid: doc.uid, state: doc.state });
                    }
                }
            }
        }
        let worked = !changed.is_empty();
        for event in &changed {
            self.callbacks.fire_unit_state(event);
        }
        worked
    }

    /// Unit-pull (§4.4): claim every unit pending for this manager
    /// (`control=umgr_pending` -> `control=umgr`), derive its effective
    /// state via `collapse`, and advance the pipeline without re-publishing
    /// (the agent already published; `push=true` still routes it to an
    /// output queue if one is registered for the collapsed state).
    pub fn unit_pull(&self) -> bool {
        let pending = self.store.units_pending(self.umgr.as_str());
        if pending.is_empty() {
            return false;
        }

        let claim = Bulk { ops: pending.iter().map(|d| BulkOp::SetControl { uid: d.uid, control: Control::Umgr }).collect() };
        if let Err(err) = self.store.apply_bulk(claim) {
            error!(%err, "unit_pull: failed to claim pending units");
            return false;
        }

        let now = self.clock.epoch_ms();
        for doc in pending {
            let Some(effective) = pum_core::collapse(&doc.states) else { continue };
            if let Err(err) = self.fabric.advance(&[doc.uid], Some(effective), now, false, true) {
                error!(uid = %doc.uid, %err, "unit_pull: advance failed");
                continue;
            }
            let mut units = self.units.write();
            if let Some(local) = units.get_mut(&doc.uid) {
                local.state = effective;
            }
        }
        true
    }

    // ---- internal wiring -----------------------------------------------

    fn spawn_pulls(self: &Arc<Self>) {
        let interval = Duration::from_secs_f64(self.config.db_poll_sleeptime_secs.max(0.001));

        let mgr = Arc::clone(self);
        let state_handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if mgr.closed.load(Ordering::Acquire) {
                    break;
                }
                mgr.state_pull();
            }
        });

        let mgr = Arc::clone(self);
        let unit_handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if mgr.closed.load(Ordering::Acquire) {
                    break;
                }
                mgr.unit_pull();
            }
        });

        self.tasks.lock().extend([state_handle, unit_handle]);
    }

    /// Drains `UMGR_SCHEDULING_PENDING` and hands each document to the
    /// scheduler plug-in's `work`, applying whatever bindings come back.
    /// Nothing else closes this loop: `submit_units` only pushes into the
    /// queue, it does not call the scheduler directly.
    fn spawn_scheduling_driver(self: &Arc<Self>, mut rx: mpsc::UnboundedReceiver<UnitDocument>) {
        let mgr = Arc::clone(self);
        let handle = tokio::spawn(async move {
            while let Some(doc) = rx.recv().await {
                let cores = serde_json::from_value::<UnitDescription>(doc.description.clone()).map(|d| d.cores).unwrap_or(1);
                match mgr.scheduler.work(vec![WaitItem { uid: doc.uid, cores }]) {
                    Ok(bindings) => {
                        for binding in bindings {
                            mgr.apply_binding(binding);
                        }
                    }
                    Err(err) => error!(%err, uid = %doc.uid, "scheduling driver: work failed"),
                }
            }
        });
        self.tasks.lock().push(handle);
    }

    /// Commit a scheduling decision: persist the pilot/sandbox binding and
    /// the `AGENT_PENDING` control flip, then advance the unit to
    /// `AGENT_STAGING_INPUT_PENDING` (§4.2's entry state for the agent-side
    /// stream) without pushing to an output queue (none is registered for
    /// it; the agent side is out of scope here).
    fn apply_binding(&self, binding: Binding) {
        let now = self.clock.epoch_ms();
        let bulk = Bulk {
            ops: vec![
                BulkOp::BindPilot { uid: binding.uid, pilot: binding.pilot, sandbox: binding.sandbox.clone() },
                BulkOp::SetControl { uid: binding.uid, control: Control::AgentPending },
            ],
        };
        if let Err(err) = self.store.apply_bulk(bulk) {
            error!(%err, uid = %binding.uid, "apply_binding: store write failed");
            return;
        }
        if let Err(err) = self.fabric.advance(&[binding.uid], Some(UnitState::AgentStagingInputPending), now, true, false) {
            error!(%err, uid = %binding.uid, "apply_binding: advance failed");
            return;
        }
        let mut units = self.units.write();
        if let Some(unit) = units.get_mut(&binding.uid) {
            unit.bind(binding.pilot, binding.sandbox);
            unit.advance(UnitState::AgentStagingInputPending, now);
        }
    }

    /// STATE-topic handler: unknown `kind` values are ignored by
    /// construction (`EntityKind` is a closed enum), but an unparsable
    /// `state` string or an unrecognized uid is also ignored rather than
    /// treated as fatal (§6 "subscriber MUST ignore").
    fn on_state_message(self: &Arc<Self>, msg: StateMessage) {
        match msg.kind {
            EntityKind::Unit => {
                let Ok(state) = msg.state.parse::<UnitState>() else { return };
                let uid = UnitId::from_string(&msg.uid);
                match self.scheduler.update_units(&[(uid, state)]) {
                    Ok(bindings) => {
                        for binding in bindings {
                            self.apply_binding(binding);
                        }
                    }
                    Err(err) => error!(%err, "on_state_message: scheduler.update_units failed"),
                }
                let mut units = self.units.write();
                if let Some(unit) = units.get_mut(&uid) {
                    unit.state = state;
                }
            }
            EntityKind::Pilot => {
                let Ok(state) = msg.state.parse::<PilotState>() else { return };
                let pid = PilotId::from_string(&msg.uid);
                match self.scheduler.update_pilots(pid, state) {
                    Ok(bindings) => {
                        for binding in bindings {
                            self.apply_binding(binding);
                        }
                    }
                    Err(err) => error!(%err, "on_state_message: scheduler.update_pilots failed"),
                }
                let mut pilots = self.pilots.write();
                if let Some(pilot) = pilots.get_mut(&pid) {
                    pilot.state = state;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
