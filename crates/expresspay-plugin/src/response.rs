// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-shot reply channel between the plugin and the host caller.
//
// The caller awaits `PendingResponse` on its own task, so the reply is
// observed on the caller's execution context no matter which thread the SDK
// completed on.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use expresspay_core::error::{ExpressPayError, Result};
use expresspay_core::types::{CompletionResult, MethodValue};
use tokio::sync::oneshot;
use tracing::debug;

/// Outcome of one method call.
pub type MethodResult = Result<MethodValue>;

/// Sending half: consumed by its single use.
#[derive(Debug)]
pub struct Responder {
    tx: oneshot::Sender<MethodResult>,
}

impl Responder {
    pub fn send(self, result: MethodResult) {
        if self.tx.send(result).is_err() {
            debug!("caller went away before its reply was delivered");
        }
    }

    pub fn success(self, value: MethodValue) {
        self.send(Ok(value));
    }

    pub fn complete(self, result: CompletionResult) {
        self.send(Ok(MethodValue::Completion(result)));
    }

    pub fn error(self, err: ExpressPayError) {
        self.send(Err(err));
    }
}

/// Receiving half, awaited by the host caller.
///
/// Resolves to [`ExpressPayError::CallDropped`] if the responder is dropped
/// without replying.
#[derive(Debug)]
pub struct PendingResponse {
    rx: oneshot::Receiver<MethodResult>,
}

impl PendingResponse {
    /// A response that is already resolved.
    pub fn ready(result: MethodResult) -> Self {
        let (responder, response) = response_channel();
        responder.send(result);
        response
    }

    /// Non-blocking check; `None` while the call is still outstanding.
    pub fn try_result(&mut self) -> Option<MethodResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(ExpressPayError::CallDropped)),
        }
    }
}

impl Future for PendingResponse {
    type Output = MethodResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(ExpressPayError::CallDropped)))
    }
}

/// Create a linked responder / response pair.
pub fn response_channel() -> (Responder, PendingResponse) {
    let (tx, rx) = oneshot::channel();
    (Responder { tx }, PendingResponse { rx })
}
