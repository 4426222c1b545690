// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backfilling placement (§4.3.2): HWM-gated admission over a deterministic
//! (uid-sorted) wait pool.

use crate::accounting::{sandbox_for, Binding, PilotAccounting, PilotRegistration, WaitItem};
use crate::error::SchedulerError;
use crate::traits::Scheduler;
use parking_lot::Mutex;
use pum_core::{rank, PilotId, PilotRole, PilotState, UnitId, UnitState};
use std::collections::HashMap;

struct BfState {
    accounting: HashMap<PilotId, PilotAccounting>,
    bound: HashMap<UnitId, (PilotId, u32)>,
    /// Insertion order is not semantically relevant (§4.3.2); iteration
    /// order is imposed by sorting on uid at scheduling time.
    wait_pool: HashMap<UnitId, WaitItem>,
}

pub struct Backfilling {
    state: Mutex<BfState>,
    start: PilotState,
    stop: PilotState,
    hwm_percent: u32,
}

impl Backfilling {
    pub fn new(start: PilotState, stop: PilotState, hwm_percent: u32) -> Self {
        Self {
            state: Mutex::new(BfState { accounting: HashMap::new(), bound: HashMap::new(), wait_pool: HashMap::new() }),
            start,
            stop,
            hwm_percent,
        }
    }

    /// One scheduling pass under a single critical section over
    /// {pilots, wait-pool} (§4.3.2 steps 1-4).
    fn schedule_pass(&self) -> Result<Vec<Binding>, SchedulerError> {
        let mut state = self.state.lock();
        let (start, stop) = (self.start, self.stop);

        let mut fillable: Vec<PilotId> = state
            .accounting
            .values()
            .filter(|acc| acc.is_eligible(start, stop) && acc.used < acc.hwm)
            .map(|acc| acc.uid)
            .collect();
        fillable.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        let mut waiters: Vec<UnitId> = state.wait_pool.keys().copied().collect();
        waiters.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        let mut bindings = Vec::new();
        for uid in waiters {
            let unit = match state.wait_pool.get(&uid).copied() {
                Some(u) => u,
                None => continue,
            };

            let mut placed_at = None;
            for (slot, pilot) in fillable.iter().enumerate() {
                let acc = state.accounting.get(pilot).ok_or_else(|| SchedulerError::UnknownPilot(pilot.to_string()))?;
                // a pilot cannot run a unit larger than its total cores.
                if unit.cores > acc.cores {
                    continue;
                }
                if acc.used <= acc.hwm {
                    placed_at = Some((slot, *pilot));
                    break;
                }
            }

            let Some((slot, pilot)) = placed_at else { continue };

            let sandbox = sandbox_for(pilot, unit.uid);
            let acc = state.accounting.get_mut(&pilot).ok_or_else(|| SchedulerError::UnknownPilot(pilot.to_string()))?;
            acc.admit(unit.uid, unit.cores)?;
            if acc.used >= acc.hwm {
                fillable.remove(slot);
            }

            state.bound.insert(unit.uid, (pilot, unit.cores));
            state.wait_pool.remove(&uid);
            bindings.push(Binding { uid: unit.uid, pilot, sandbox });
        }

        Ok(bindings)
    }
}

impl Scheduler for Backfilling {
    fn add_pilots(&self, pilots: Vec<PilotRegistration>) -> Result<Vec<Binding>, SchedulerError> {
        {
            let mut state = self.state.lock();
            for reg in pilots {
                state.accounting.insert(reg.uid, PilotAccounting::new(reg, self.hwm_percent));
            }
        }
        self.schedule_pass()
    }

    fn remove_pilots(&self, pids: &[PilotId]) -> Result<(), SchedulerError> {
        let mut state = self.state.lock();
        for pid in pids {
            match state.accounting.get_mut(pid) {
                Some(acc) => acc.role = PilotRole::Removed,
                None => return Err(SchedulerError::UnknownPilot(pid.to_string())),
            }
        }
        Ok(())
    }

    fn update_pilots(&self, pid: PilotId, new_state: PilotState) -> Result<Vec<Binding>, SchedulerError> {
        {
            let mut state = self.state.lock();
            let acc = state.accounting.get_mut(&pid).ok_or_else(|| SchedulerError::UnknownPilot(pid.to_string()))?;
            acc.state = new_state;
        }
        self.schedule_pass()
    }

    fn update_units(&self, updates: &[(UnitId, UnitState)]) -> Result<Vec<Binding>, SchedulerError> {
        {
            let mut state = self.state.lock();
            for &(uid, new_state) in updates {
                if rank(new_state) <= rank(UnitState::agent_executing()) {
                    continue;
                }
                if let Some((pid, cores)) = state.bound.get(&uid).copied() {
                    let acc = state.accounting.get_mut(&pid).ok_or_else(|| {
                        let msg = format!("unit {uid} bound to unknown pilot {pid}");
                        tracing::error!("{msg}");
                        SchedulerError::Inconsistent(msg)
                    })?;
                    acc.release(uid, cores)?;
                }
            }
        }
        self.schedule_pass()
    }

    fn work(&self, units: Vec<WaitItem>) -> Result<Vec<Binding>, SchedulerError> {
        {
            let mut state = self.state.lock();
            for u in units {
                state.wait_pool.insert(u.uid, u);
            }
        }
        self.schedule_pass()
    }
}

#[cfg(test)]
#[path = "backfilling_tests.rs"]
mod tests;
