// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pum_core::{StateObservation, Unit, UnitDescription, UnitState};

fn sample_doc(umgr: &str) -> UnitDocument {
    let unit = Unit::new(UnitId::new(), UnitDescription::new(2), 0);
    UnitDocument::from_unit(&unit, umgr)
}

#[test]
fn insert_then_get_round_trips() {
    let store = InMemoryStore::new();
    let doc = sample_doc("umgr-1");
    let uid = doc.uid;
    store.insert_unit(doc).unwrap();
    let fetched = store.get_unit(&uid).unwrap();
    assert_eq!(fetched.uid, uid);
}

#[test]
fn insert_duplicate_uid_is_rejected() {
    let store = InMemoryStore::new();
    let doc = sample_doc("umgr-1");
    let dup = doc.clone();
    store.insert_unit(doc).unwrap();
    assert!(matches!(store.insert_unit(dup), Err(StoreError::UnitAlreadyExists(_))));
}

#[test]
fn get_unknown_unit_errors() {
    let store = InMemoryStore::new();
    let err = store.get_unit(&UnitId::new()).unwrap_err();
    assert!(matches!(err, StoreError::UnitNotFound(_)));
}

#[test]
fn units_pending_filters_by_umgr_and_control() {
    let store = InMemoryStore::new();
    let mut pending = sample_doc("umgr-1");
    pending.control = Control::UmgrPending;
    let mut owned = sample_doc("umgr-1");
    owned.control = Control::Umgr;
    let mut other_umgr = sample_doc("umgr-2");
    other_umgr.control = Control::UmgrPending;

    let pending_uid = pending.uid;
    store.insert_unit(pending).unwrap();
    store.insert_unit(owned).unwrap();
    store.insert_unit(other_umgr).unwrap();

    let found = store.units_pending("umgr-1");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].uid, pending_uid);
}

#[test]
fn apply_bulk_advance_state_respects_terminal_latch() {
    let store = InMemoryStore::new();
    let doc = sample_doc("umgr-1");
    let uid = doc.uid;
    store.insert_unit(doc).unwrap();

    let bulk = Bulk {
        ops: vec![
            BulkOp::AdvanceState {
                uid,
                state: UnitState::Done,
                observation: StateObservation { state: UnitState::Done, timestamp_ms: 10 },
            },
            BulkOp::AdvanceState {
                uid,
                state: UnitState::Failed,
                observation: StateObservation { state: UnitState::Failed, timestamp_ms: 20 },
            },
        ],
    };
    store.apply_bulk(bulk).unwrap();

    let fetched = store.get_unit(&uid).unwrap();
    assert_eq!(fetched.state, UnitState::Done);
    assert_eq!(fetched.statehistory.len(), 3);
}

#[test]
fn apply_bulk_set_control_updates_ownership() {
    let store = InMemoryStore::new();
    let doc = sample_doc("umgr-1");
    let uid = doc.uid;
    store.insert_unit(doc).unwrap();

    store.apply_bulk(Bulk { ops: vec![BulkOp::SetControl { uid, control: Control::Agent }] }).unwrap();
    assert_eq!(store.get_unit(&uid).unwrap().control, Control::Agent);
}

#[test]
fn apply_bulk_unknown_unit_errors_without_partial_effects() {
    let store = InMemoryStore::new();
    let known = sample_doc("umgr-1");
    let known_uid = known.uid;
    store.insert_unit(known).unwrap();

    let bulk = Bulk {
        ops: vec![
            BulkOp::SetControl { uid: known_uid, control: Control::Agent },
            BulkOp::SetControl { uid: UnitId::new(), control: Control::Agent },
        ],
    };
    assert!(store.apply_bulk(bulk).is_err());
    // first op in the bulk still lands: the in-memory store applies in order
    // and does not roll back earlier ops in the same bulk.
    assert_eq!(store.get_unit(&known_uid).unwrap().control, Control::Agent);
}

#[test]
fn apply_bulk_bind_pilot_sets_pilot_and_sandbox_once() {
    let store = InMemoryStore::new();
    let doc = sample_doc("umgr-1");
    let uid = doc.uid;
    store.insert_unit(doc).unwrap();

    let first = PilotId::new();
    store
        .apply_bulk(Bulk { ops: vec![BulkOp::BindPilot { uid, pilot: first, sandbox: "sbox-1".into() }] })
        .unwrap();
    let fetched = store.get_unit(&uid).unwrap();
    assert_eq!(fetched.pilot, Some(first));
    assert_eq!(fetched.sandbox.as_deref(), Some("sbox-1"));

    // a unit is bound at most once; a second bind is a no-op.
    let second = PilotId::new();
    store
        .apply_bulk(Bulk { ops: vec![BulkOp::BindPilot { uid, pilot: second, sandbox: "sbox-2".into() }] })
        .unwrap();
    assert_eq!(store.get_unit(&uid).unwrap().pilot, Some(first));
}

#[test]
fn pilot_insert_and_lookup() {
    let store = InMemoryStore::new();
    let pilot = pum_core::Pilot::new(PilotId::new(), pum_core::PilotDescription::new(16));
    let uid = pilot.uid;
    store.insert_pilot(PilotDocument::from_pilot(&pilot)).unwrap();
    assert_eq!(store.get_pilot(&uid).unwrap().cores, 16);
    assert_eq!(store.all_pilots().len(), 1);
}
