// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic view of the vendor ExpressPay SDK.
//
// The SDK completes work through three listener interfaces. Here each
// listener is a one-shot boxed closure: the SDK calls it at most once, from
// whatever thread it likes.

use expresspay_core::error::Result;
use expresspay_core::types::{ActivityResult, ParameterSet, PaymentFinished, QueryFinished, SubmitFinished};

/// Receives the outcome of a checkout UI flow.
pub type PaymentCallback = Box<dyn FnOnce(PaymentFinished) + Send + 'static>;

/// Receives the merchant-server response to a submit.
pub type SubmitCallback = Box<dyn FnOnce(SubmitFinished) + Send + 'static>;

/// Receives the result of a payment status query.
pub type QueryCallback = Box<dyn FnOnce(QueryFinished) + Send + 'static>;

/// One SDK session bound to a merchant server URL.
pub trait PaymentSdk: Send {
    /// Toggle the SDK's internal debug logging.
    fn set_debug_mode(&mut self, debug: bool);

    /// Order id of the last submitted order, if any.
    fn order_id(&self) -> Option<String>;

    /// Checkout token obtained by the last submit, if any.
    fn token(&self) -> Option<String>;

    /// Submit the order to the merchant server, then launch the checkout UI.
    /// `on_finished` fires once the checkout activity completes.
    fn submit_and_checkout(&mut self, params: &ParameterSet, on_finished: PaymentCallback) -> Result<()>;

    /// Submit the order only.
    fn submit(&mut self, params: &ParameterSet, on_finished: SubmitCallback) -> Result<()>;

    /// Launch the checkout UI for the order of a previous submit.
    ///
    /// An `Err` means the flow never started.
    fn checkout(&mut self) -> Result<()>;

    /// Launch the checkout UI with a token obtained elsewhere.
    fn checkout_with_token(&mut self, token: &str, redirect_url: Option<&str>) -> Result<()>;

    /// Ask the merchant server for the status of a payment.
    fn query(&mut self, token: &str, on_finished: QueryCallback) -> Result<()>;

    /// Forward a host activity result into the SDK.
    ///
    /// Returns the payment outcome when the SDK reports it synchronously for
    /// this event instead of through a registered [`PaymentCallback`].
    fn on_activity_result(&mut self, result: &ActivityResult) -> Option<PaymentFinished>;
}

/// Creates SDK sessions. One factory lives for the whole plugin.
pub trait SdkFactory: Send + Sync {
    /// Human-readable platform name (e.g. "Android").
    fn platform_name(&self) -> &str;

    /// Construct a session against the given merchant server.
    fn create_session(&self, server_url: &str) -> Result<Box<dyn PaymentSdk>>;
}
