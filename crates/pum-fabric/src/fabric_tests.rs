// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use parking_lot::Mutex;
use pum_core::{Unit, UnitDescription, UnitId};
use pum_storage::InMemoryStore;
use std::sync::Arc;

fn seeded_fabric() -> (Fabric<InMemoryStore>, UnitId) {
    let store = Arc::new(InMemoryStore::new());
    let unit = Unit::new(UnitId::new(), UnitDescription::new(1), 0);
    let uid = unit.uid;
    store.insert_unit(pum_storage::UnitDocument::from_unit(&unit, "umgr-1")).unwrap();
    (Fabric::new(store), uid)
}

#[tokio::test]
async fn advance_commits_state_and_publishes() {
    let (fabric, uid) = seeded_fabric();
    let received: Arc<Mutex<Vec<StateMessage>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    fabric.subscribe_state(move |msg| sink.lock().push(msg));

    fabric.advance(&[uid], Some(UnitState::Scheduling), 5, true, false).unwrap();
    tokio::task::yield_now().await;
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let got = received.lock();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].state, "SCHEDULING");
    assert_eq!(got[0].uid, uid.to_string());
}

#[tokio::test]
async fn advance_pushes_into_registered_output_queue() {
    let (fabric, uid) = seeded_fabric();
    let mut rx = fabric.create_output_queue(OutputQueue::SchedulingPending);
    fabric.register_output(UnitState::Scheduling, OutputQueue::SchedulingPending);

    fabric.advance(&[uid], Some(UnitState::Scheduling), 5, false, true).unwrap();

    let doc = rx.recv().await.unwrap();
    assert_eq!(doc.uid, uid);
    assert_eq!(doc.state, UnitState::Scheduling);
}

#[tokio::test]
async fn advance_without_new_state_only_publishes_current() {
    let (fabric, uid) = seeded_fabric();
    let received: Arc<Mutex<Vec<StateMessage>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    fabric.subscribe_state(move |msg| sink.lock().push(msg));

    fabric.advance(&[uid], None, 5, true, false).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    assert_eq!(received.lock()[0].state, "NEW");
}

#[tokio::test]
async fn control_topic_delivers_in_publish_order() {
    let store = Arc::new(InMemoryStore::new());
    let fabric = Fabric::new(store);
    let received: Arc<Mutex<Vec<ControlMessage>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    fabric.subscribe_control(move |msg| sink.lock().push(msg));

    fabric.publish_control(ControlMessage::CancelUnits { uids: vec![] });
    fabric.publish_control(ControlMessage::RemovePilots { pids: vec![], umgr: "umgr-1".into() });
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;

    let got = received.lock();
    assert_eq!(got.len(), 2);
    assert!(matches!(got[0], ControlMessage::CancelUnits { .. }));
    assert!(matches!(got[1], ControlMessage::RemovePilots { .. }));
}
