// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Registry of callbacks owned by Java-side listener objects.
//
// Java only ever holds an integer id. The callback stays here until the
// first delivery claims it, so a repeated or stale id finds nothing.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

/// Id-keyed store of one-shot listener callbacks.
pub struct ListenerRegistry<T> {
    next_id: AtomicI64,
    entries: Mutex<BTreeMap<i64, T>>,
}

impl<T> ListenerRegistry<T> {
    pub const fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Store `value` and return the id Java passes back on delivery.
    /// Ids start at 1 and are never reused.
    pub fn register(&self, value: T) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, value);
        id
    }

    /// Remove and return the entry for `id`.
    pub fn claim(&self, id: i64) -> Option<T> {
        let claimed = self
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
        if claimed.is_none() {
            tracing::debug!(id, "listener id unknown or already delivered");
        }
        claimed
    }

    /// Number of listeners still waiting for delivery.
    pub fn outstanding(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl<T> Default for ListenerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
