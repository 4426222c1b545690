// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pum_core::PilotState;

fn registration(cores: u32) -> PilotRegistration {
    PilotRegistration { uid: PilotId::new(), cores, state: PilotState::PmgrActive }
}

#[test]
fn backfill_hwm_200_scenario_2() {
    let bf = Backfilling::new(PilotState::PmgrActive, PilotState::PmgrActive, 200);
    let reg = registration(2);
    let pid = reg.uid;
    bf.add_pilots(vec![reg]).unwrap();

    let units: Vec<WaitItem> = (0..10).map(|_| WaitItem { uid: UnitId::new(), cores: 1 }).collect();
    let unit_uids: Vec<UnitId> = units.iter().map(|u| u.uid).collect();
    let bindings = bf.work(units).unwrap();

    assert_eq!(bindings.len(), 4);
    assert_eq!(bf.state.lock().accounting[&pid].used, 4);
    assert_eq!(bf.state.lock().wait_pool.len(), 6);

    // release two of the admitted units past AGENT_EXECUTING, in one batch
    let released: Vec<UnitId> = bindings.iter().map(|b| b.uid).take(2).collect();
    let updates: Vec<(UnitId, UnitState)> =
        released.iter().map(|&uid| (uid, UnitState::AgentStagingOutputPending)).collect();
    bf.update_units(&updates).unwrap();

    // both releases land before the resulting pass, which admits two more
    // waiters into the freed capacity.
    assert_eq!(bf.state.lock().accounting[&pid].used, 4);
    assert_eq!(bf.state.lock().wait_pool.len(), 4);
    let _ = unit_uids;
}

#[test]
fn oversize_unit_rejection_scenario_3() {
    let bf = Backfilling::new(PilotState::PmgrActive, PilotState::PmgrActive, 200);
    bf.add_pilots(vec![registration(2)]).unwrap();

    let uid = UnitId::new();
    let bindings = bf.work(vec![WaitItem { uid, cores: 8 }]).unwrap();
    assert!(bindings.is_empty());
    assert_eq!(bf.state.lock().wait_pool.len(), 1);
}

#[test]
fn ineligible_pilot_state_leaves_units_waiting() {
    let bf = Backfilling::new(PilotState::PmgrActive, PilotState::PmgrActive, 200);
    bf.add_pilots(vec![registration(4)]).unwrap();
    let pid = bf.state.lock().accounting.keys().next().copied().unwrap();
    bf.update_pilots(pid, PilotState::PmgrLaunching).unwrap();

    let bindings = bf.work(vec![WaitItem { uid: UnitId::new(), cores: 1 }]).unwrap();
    assert!(bindings.is_empty());
}

#[test]
fn remove_unknown_pilot_errors() {
    let bf = Backfilling::new(PilotState::PmgrActive, PilotState::PmgrActive, 200);
    assert!(matches!(bf.remove_pilots(&[PilotId::new()]), Err(SchedulerError::UnknownPilot(_))));
}

#[test]
fn used_never_negative_on_duplicate_release() {
    let bf = Backfilling::new(PilotState::PmgrActive, PilotState::PmgrActive, 200);
    bf.add_pilots(vec![registration(4)]).unwrap();
    let uid = UnitId::new();
    bf.work(vec![WaitItem { uid, cores: 2 }]).unwrap();

    bf.update_units(&[(uid, UnitState::Done)]).unwrap();
    bf.update_units(&[(uid, UnitState::Done)]).unwrap();
    let used = bf.state.lock().accounting.values().next().unwrap().used;
    assert_eq!(used, 0);
}
