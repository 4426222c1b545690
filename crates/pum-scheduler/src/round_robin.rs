// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Round-robin placement (§4.3.1): cursor over the eligible-pilot list, no
//! capacity check. Minimal correct policy when throughput dominates over
//! fairness-by-size.

use crate::accounting::{sandbox_for, Binding, PilotAccounting, PilotRegistration, WaitItem};
use crate::error::SchedulerError;
use crate::traits::Scheduler;
use parking_lot::Mutex;
use pum_core::{rank, PilotId, PilotState, UnitId, UnitState};
use std::collections::{HashMap, VecDeque};

struct RrState {
    /// Insertion order of every pilot ever added; eligibility is
    /// recomputed from this on each scheduling attempt.
    order: Vec<PilotId>,
    accounting: HashMap<PilotId, PilotAccounting>,
    bound: HashMap<UnitId, (PilotId, u32)>,
    idx: usize,
    wait_pool: VecDeque<WaitItem>,
}

pub struct RoundRobin {
    state: Mutex<RrState>,
    start: PilotState,
    stop: PilotState,
}

impl RoundRobin {
    pub fn new(start: PilotState, stop: PilotState) -> Self {
        Self {
            state: Mutex::new(RrState {
                order: Vec::new(),
                accounting: HashMap::new(),
                bound: HashMap::new(),
                idx: 0,
                wait_pool: VecDeque::new(),
            }),
            start,
            stop,
        }
    }

    /// Current cursor position, for test assertions against §8 scenario 1.
    pub fn cursor(&self) -> usize {
        self.state.lock().idx
    }

    fn schedule_batch(&self, units: Vec<WaitItem>) -> Result<Vec<Binding>, SchedulerError> {
        let mut bindings = Vec::new();
        let mut state = self.state.lock();
        for u in units {
            match Self::try_bind(&mut state, self.start, self.stop, u)? {
                Some(binding) => bindings.push(binding),
                None => state.wait_pool.push_back(u),
            }
        }
        Ok(bindings)
    }

    fn try_bind(
        state: &mut RrState,
        start: PilotState,
        stop: PilotState,
        unit: WaitItem,
    ) -> Result<Option<Binding>, SchedulerError> {
        let eligible: Vec<PilotId> =
            state.order.iter().copied().filter(|pid| state.accounting[pid].is_eligible(start, stop)).collect();
        if eligible.is_empty() {
            return Ok(None);
        }

        let idx = state.idx % eligible.len();
        let pilot = eligible[idx];
        state.idx = (idx + 1) % eligible.len();

        let sandbox = sandbox_for(pilot, unit.uid);
        let acc = state.accounting.get_mut(&pilot).ok_or_else(|| SchedulerError::UnknownPilot(pilot.to_string()))?;
        acc.admit(unit.uid, unit.cores)?;
        state.bound.insert(unit.uid, (pilot, unit.cores));

        Ok(Some(Binding { uid: unit.uid, pilot, sandbox }))
    }
}

impl Scheduler for RoundRobin {
    fn add_pilots(&self, pilots: Vec<PilotRegistration>) -> Result<Vec<Binding>, SchedulerError> {
        let waiters: Vec<WaitItem> = {
            let mut state = self.state.lock();
            for reg in pilots {
                state.order.push(reg.uid);
                // round-robin never consults hwm; 100% is an inert default.
                state.accounting.insert(reg.uid, PilotAccounting::new(reg, 100));
            }
            state.wait_pool.drain(..).collect()
        };
        self.schedule_batch(waiters)
    }

    fn remove_pilots(&self, pids: &[PilotId]) -> Result<(), SchedulerError> {
        let mut state = self.state.lock();
        for pid in pids {
            match state.accounting.get_mut(pid) {
                Some(acc) => acc.role = pum_core::PilotRole::Removed,
                None => return Err(SchedulerError::UnknownPilot(pid.to_string())),
            }
            state.order.retain(|p| p != pid);
        }
        Ok(())
    }

    fn update_pilots(&self, pid: PilotId, new_state: PilotState) -> Result<Vec<Binding>, SchedulerError> {
        let waiters: Vec<WaitItem> = {
            let mut state = self.state.lock();
            let acc = state.accounting.get_mut(&pid).ok_or_else(|| SchedulerError::UnknownPilot(pid.to_string()))?;
            acc.state = new_state;
            state.wait_pool.drain(..).collect()
        };
        self.schedule_batch(waiters)
    }

    fn update_units(&self, updates: &[(UnitId, UnitState)]) -> Result<Vec<Binding>, SchedulerError> {
        let waiters: Vec<WaitItem> = {
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
            state.wait_pool.drain(..).collect()
        };
        self.schedule_batch(waiters)
    }

    fn work(&self, units: Vec<WaitItem>) -> Result<Vec<Binding>, SchedulerError> {
        self.schedule_batch(units)
    }
}

#[cfg(test)]
#[path = "round_robin_tests.rs"]
mod tests;
