// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pum_core::define_id! {
    /// Unique identifier for a unit-manager instance, stamped onto every
    /// document it owns (§6 `umgr` field).
    pub struct UmgrId("umg-");
}
