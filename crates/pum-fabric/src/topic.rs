// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Generic single-topic pub/sub primitive.
//!
//! Delivery to each subscriber preserves publish order (an unbounded mpsc
//! channel per subscriber, fed from a single, lock-serialized `publish`
//! call); handlers run on a bus-owned task, isolated from each other.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct Topic<T> {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<T>>>,
}

impl<T> Default for Topic<T> {
    fn default() -> Self {
        Self { subscribers: Mutex::new(Vec::new()) }
    }
}

impl<T: Clone + Send + 'static> Topic<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire-and-forget, best-effort: a subscriber whose task has already
    /// exited is dropped from the list rather than treated as an error.
    pub fn publish(&self, message: T) {
        let mut subs = self.subscribers.lock();
        subs.retain(|tx| tx.send(message.clone()).is_ok());
    }

    /// Register `handler` to run once per message, on its own task, in
    /// publish order.
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();
        self.subscribers.lock().push(tx);
        let handler = Arc::new(handler);
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                handler(message);
            }
        });
    }
}
