// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn eligible_within_bounds() {
    let pilot = Pilot::builder().state(PilotState::PmgrActive).build();
    assert!(pilot.is_eligible(PilotState::PmgrActive, PilotState::PmgrActive));
}

#[test]
fn ineligible_when_removed() {
    let mut pilot = Pilot::builder().state(PilotState::PmgrActive).build();
    pilot.role = PilotRole::Removed;
    assert!(!pilot.is_eligible(PilotState::PmgrActive, PilotState::PmgrActive));
}

#[test]
fn ineligible_before_start() {
    let pilot = Pilot::builder().state(PilotState::PmgrLaunching).build();
    assert!(!pilot.is_eligible(PilotState::PmgrActive, PilotState::PmgrActive));
}

#[test]
fn ineligible_after_stop() {
    let pilot = Pilot::builder().state(PilotState::Done).build();
    assert!(!pilot.is_eligible(PilotState::PmgrActive, PilotState::PmgrActive));
}

#[test]
fn description_round_trips_extensions() {
    let mut descr = PilotDescription::new(8);
    descr.extensions.insert("resource".into(), serde_json::json!("futuregrid.alamo"));
    let json = serde_json::to_string(&descr).unwrap();
    let back: PilotDescription = serde_json::from_str(&json).unwrap();
    assert_eq!(back.cores, 8);
    assert_eq!(back.extensions.get("resource"), Some(&serde_json::json!("futuregrid.alamo")));
}
