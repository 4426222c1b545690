// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FabricError {
    #[error("no output queue registered for state {0}")]
    UnregisteredOutput(String),

    #[error("store failure during advance: {0}")]
    Store(String),
}

impl From<pum_storage::StoreError> for FabricError {
    fn from(err: pum_storage::StoreError) -> Self {
        FabricError::Store(err.to_string())
    }
}
