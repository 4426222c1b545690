// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store-side error taxonomy (§7: transient store errors are not retried
//! inside the core; they surface to the caller/worker).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unit {0} not found")]
    UnitNotFound(String),

    #[error("pilot {0} not found")]
    PilotNotFound(String),

    #[error("unit {0} already exists")]
    UnitAlreadyExists(String),

    /// A transient failure from the backing store (connection loss, I/O
    /// error in a real deployment). The in-memory store never produces
    /// this variant itself, but callers (the update worker, in particular)
    /// must treat it as fatal to their own loop per §4.2 "Failure policy".
    #[error("transient store failure: {0}")]
    Transient(String),
}
