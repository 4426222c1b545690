// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unit-manager error taxonomy (§7): usage errors are synchronous and leave
//! no state change; inconsistency/store errors are wrapped rather than
//! conflated with caller mistakes.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UmgrError {
    #[error("unit manager is closed")]
    Closed,

    #[error("no pilots given")]
    EmptyPilotList,

    #[error("pilot {0} already added")]
    PilotAlreadyAdded(String),

    #[error("unknown pilot {0}")]
    UnknownPilot(String),

    #[error("unknown unit {0}")]
    UnknownUnit(String),

    #[error("drain is not implemented")]
    DrainUnsupported,

    #[error("store error: {0}")]
    Store(String),

    #[error("fabric error: {0}")]
    Fabric(String),

    #[error("scheduler error: {0}")]
    Scheduler(String),
}

impl From<pum_storage::StoreError> for UmgrError {
    fn from(err: pum_storage::StoreError) -> Self {
        UmgrError::Store(err.to_string())
    }
}

impl From<pum_fabric::FabricError> for UmgrError {
    fn from(err: pum_fabric::FabricError) -> Self {
        UmgrError::Fabric(err.to_string())
    }
}

impl From<pum_scheduler::SchedulerError> for UmgrError {
    fn from(err: pum_scheduler::SchedulerError) -> Self {
        UmgrError::Scheduler(err.to_string())
    }
}
