// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pum-storage: the persistent-store half of the message fabric adapter
//! (C5, §5, §6).

pub mod bulk;
pub mod document;
pub mod error;
pub mod store;

pub use bulk::{Bulk, BulkCollector, BulkOp};
pub use document::{Control, PilotDocument, UnitDocument};
pub use error::StoreError;
pub use store::{InMemoryStore, Store};
