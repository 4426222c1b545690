// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error types for the core data model.

use thiserror::Error;

/// Errors raised while parsing wire-level state/role strings into the
/// closed enumerations defined in this crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PumError {
    #[error("unknown unit state: {0:?}")]
    UnknownUnitState(String),

    #[error("unknown pilot state: {0:?}")]
    UnknownPilotState(String),

    #[error("unknown pilot role: {0:?}")]
    UnknownPilotRole(String),

    #[error("pilot {uid} has no accounting record")]
    NoAccountingRecord { uid: String },
}
