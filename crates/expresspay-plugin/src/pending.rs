// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pending-call tracker: the single slot holding the caller of an in-flight
// checkout flow.
//
// The slot is either Empty or Armed. Arming while Armed overwrites the slot;
// the overwritten caller's responder is dropped, so that caller observes
// `CallDropped` rather than a second caller's result. Every arm gets a fresh
// generation, and resolution through an `ArmedCall` only succeeds while that
// same generation is still armed, so a late SDK callback can never reach a
// newer caller.

use std::sync::{Arc, Mutex, MutexGuard};

use expresspay_core::types::CheckoutKind;
use tracing::{debug, warn};

use crate::response::{MethodResult, Responder};

/// Ticket identifying one armed checkout call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedCall {
    pub kind: CheckoutKind,
    pub generation: u64,
}

#[derive(Debug)]
enum Slot {
    Empty,
    Armed { call: ArmedCall, responder: Responder },
}

#[derive(Debug)]
struct Inner {
    slot: Slot,
    next_generation: u64,
}

/// Shared handle to the slot. Clones refer to the same slot, which lets SDK
/// callbacks running on other threads resolve it.
#[derive(Debug, Clone)]
pub struct PendingCallTracker {
    inner: Arc<Mutex<Inner>>,
}

impl Default for PendingCallTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingCallTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                slot: Slot::Empty,
                next_generation: 1,
            })),
        }
    }

    // Slot transitions are single assignments, so a poisoned lock still
    // holds a consistent slot.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Arm the slot for a new checkout call, overwriting any armed call.
    pub fn arm(&self, kind: CheckoutKind, responder: Responder) -> ArmedCall {
        let mut inner = self.lock();
        let call = ArmedCall {
            kind,
            generation: inner.next_generation,
        };
        inner.next_generation += 1;

        let previous = std::mem::replace(&mut inner.slot, Slot::Armed { call, responder });
        drop(inner);

        if let Slot::Armed { call: prior, .. } = previous {
            warn!(
                prior = ?prior.kind,
                next = ?kind,
                "checkout started while another was pending; dropping the earlier caller"
            );
        }
        debug!(?kind, generation = call.generation, "pending call armed");
        call
    }

    /// The currently armed call, if any.
    pub fn armed(&self) -> Option<ArmedCall> {
        match self.lock().slot {
            Slot::Armed { call, .. } => Some(call),
            Slot::Empty => None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed().is_some()
    }

    /// Resolve `call` if it is still the armed one. Returns whether a reply
    /// was delivered.
    pub fn resolve(&self, call: ArmedCall, result: MethodResult) -> bool {
        let mut inner = self.lock();
        let matches = matches!(inner.slot, Slot::Armed { call: armed, .. } if armed == call);
        if !matches {
            drop(inner);
            warn!(kind = ?call.kind, generation = call.generation, "ignoring result for a call that is no longer pending");
            return false;
        }

        let Slot::Armed { responder, .. } = std::mem::replace(&mut inner.slot, Slot::Empty) else {
            return false;
        };
        drop(inner);

        debug!(kind = ?call.kind, generation = call.generation, "pending call resolved");
        responder.send(result);
        true
    }
}
