// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pum_core::ConfigBuilder;

#[test]
fn round_robin_is_the_default() {
    let config = Config::default();
    assert_eq!(config.scheduler, SchedulerKind::RoundRobin);
    let scheduler = build(&config);
    assert_eq!(scheduler.add_pilots(Vec::new()).unwrap().len(), 0);
}

#[test]
fn backfilling_kind_builds_a_backfilling_scheduler() {
    let config = ConfigBuilder::default().scheduler(SchedulerKind::Backfilling).hwm_percent(150).build();
    let scheduler = build(&config);
    // no direct downcast available; a successful empty add_pilots call is
    // the behavioral proxy that construction didn't panic on bad settings.
    assert_eq!(scheduler.add_pilots(Vec::new()).unwrap().len(), 0);
}
