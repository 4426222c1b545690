// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_unit_starts_in_new_state_with_one_history_entry() {
    let unit = Unit::new(UnitId::new(), UnitDescription::new(2), 1000);
    assert_eq!(unit.state, UnitState::New);
    assert_eq!(unit.state_history.len(), 1);
    assert!(unit.pilot.is_none());
}

#[test]
fn bind_sets_pilot_and_sandbox_once() {
    let mut unit = Unit::new(UnitId::new(), UnitDescription::new(2), 0);
    let pilot = PilotId::new();
    unit.bind(pilot, "/sandbox/a");
    assert_eq!(unit.pilot, Some(pilot));
    assert_eq!(unit.sandbox.as_deref(), Some("/sandbox/a"));

    // Re-binding to a different pilot must not migrate the unit.
    let other = PilotId::new();
    unit.bind(other, "/sandbox/b");
    assert_eq!(unit.pilot, Some(pilot));
    assert_eq!(unit.sandbox.as_deref(), Some("/sandbox/a"));
}

#[test]
fn advance_past_terminal_preserves_scalar_state() {
    let mut unit = Unit::builder().build();
    unit.advance(UnitState::Done, 10);
    assert_eq!(unit.state, UnitState::Done);

    unit.advance(UnitState::Failed, 20);
    assert_eq!(unit.state, UnitState::Done, "first terminal must win");
    assert_eq!(unit.state_history.len(), 3, "history still records the race");
}

#[test]
fn description_carries_opaque_extensions() {
    let mut descr = UnitDescription::new(4);
    descr.extensions.insert("executable".into(), serde_json::json!("/bin/sleep"));
    let json = serde_json::to_string(&descr).unwrap();
    let back: UnitDescription = serde_json::from_str(&json).unwrap();
    assert_eq!(back.cores, 4);
    assert_eq!(back.extensions.get("executable"), Some(&serde_json::json!("/bin/sleep")));
}
