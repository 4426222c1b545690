// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Any store-side failure is fatal to the worker (§4.2 "Failure policy");
/// the worker performs no local retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpdateError {
    #[error("update worker: fatal store failure: {0}")]
    Fatal(String),
}
