// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-`uid` linearization cache (§4.2 "Linearization algorithm").
//!
//! `last`/`unsent`/`final` as specified: `last` is the rank of the highest
//! state already committed to the scalar field; `unsent` holds ranks
//! observed but not yet part of a consecutive run from `last`; `final`
//! latches once a terminal state has been committed, after which every
//! further observation is history-only.

use std::collections::BTreeSet;

use pum_core::UnitState;

/// What the worker should do with a freshly observed state, beyond the
/// unconditional history append every arrival gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinearizeOutcome {
    /// Append to history only; the scalar `state` field does not move.
    HistoryOnly,
    /// Commit this state to the scalar `state` field.
    Advance(UnitState),
}

#[derive(Debug, Clone)]
pub struct Linearization {
    last: u32,
    unsent: BTreeSet<u32>,
    final_: bool,
}

impl Linearization {
    /// `last` starts at the rank of the stream's entry state: the record is
    /// already understood to be at that state before this cache exists.
    pub fn new(entry_state: UnitState) -> Self {
        Self { last: entry_state.rank(), unsent: BTreeSet::new(), final_: false }
    }

    pub fn is_final(&self) -> bool {
        self.final_
    }

    /// Observe state `s`. Returns what the caller should emit to the store
    /// in addition to the unconditional history-append every arrival gets.
    pub fn observe(&mut self, state: UnitState) -> LinearizeOutcome {
        if self.final_ {
            return LinearizeOutcome::HistoryOnly;
        }

        if state.is_terminal() {
            self.final_ = true;
            return LinearizeOutcome::Advance(state);
        }

        self.unsent.insert(state.rank());

        let mut extracted = None;
        loop {
            let next_rank = self.last + 1;
            if self.unsent.remove(&next_rank) {
                self.last = next_rank;
                extracted = Some(next_rank);
            } else {
                break;
            }
        }

        match extracted {
            Some(rank) => LinearizeOutcome::Advance(UnitState::from_rank(rank).unwrap_or(state)),
            None => LinearizeOutcome::HistoryOnly,
        }
    }
}

#[cfg(test)]
#[path = "linearize_tests.rs"]
mod tests;
