// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operation dispatcher: the plugin object the host binds to its method
// channel.
//
// `submit` and `query` reply through their own SDK callback. The three
// checkout-family operations arm the pending-call slot and are resolved
// later, either by the SDK's payment callback or by a host activity result.

use expresspay_bridge::platform_sdk_factory;
use expresspay_bridge::traits::{PaymentCallback, PaymentSdk, QueryCallback, SdkFactory, SubmitCallback};
use expresspay_core::PluginConfig;
use expresspay_core::error::{ExpressPayError, Result};
use expresspay_core::types::{ActivityResult, CheckoutKind, MethodArgs, MethodValue, Operation};
use tracing::{debug, info, instrument, warn};

use crate::completion::{self, complete};
use crate::pending::{ArmedCall, PendingCallTracker};
use crate::request::build_parameter_set;
use crate::response::{PendingResponse, response_channel};

/// ExpressPay method-channel handler.
pub struct ExpressPayPlugin {
    config: PluginConfig,
    factory: Box<dyn SdkFactory>,
    sdk: Option<Box<dyn PaymentSdk>>,
    activity_attached: bool,
    pending: PendingCallTracker,
}

impl ExpressPayPlugin {
    pub fn new(config: PluginConfig, factory: Box<dyn SdkFactory>) -> Self {
        info!(
            channel = %config.channel_name,
            platform = factory.platform_name(),
            "ExpressPay plugin registered"
        );
        Self {
            config,
            factory,
            sdk: None,
            activity_attached: false,
            pending: PendingCallTracker::new(),
        }
    }

    /// Plugin backed by the SDK of the current target platform.
    pub fn for_platform(config: PluginConfig) -> Self {
        Self::new(config, platform_sdk_factory())
    }

    pub fn channel_name(&self) -> &str {
        &self.config.channel_name
    }

    pub fn is_initialized(&self) -> bool {
        self.sdk.is_some()
    }

    /// Checkout operation currently awaiting its result.
    pub fn pending_kind(&self) -> Option<CheckoutKind> {
        self.pending.armed().map(|call| call.kind)
    }

    // -- Activity lifecycle ------------------------------------------------

    pub fn attach_activity(&mut self) {
        debug!("host activity attached");
        self.activity_attached = true;
    }

    /// Detaching leaves the session and any pending call in place; a
    /// reattached activity picks them up again.
    pub fn detach_activity(&mut self) {
        debug!("host activity detached");
        self.activity_attached = false;
    }

    // -- Method channel ----------------------------------------------------

    /// Route a method call by name. Unknown names reply `NotImplemented`.
    pub fn handle_method_call(&mut self, method: &str, args: &MethodArgs) -> PendingResponse {
        match Operation::from_method(method) {
            Some(op) => self.dispatch(op, args),
            None => {
                debug!(method, "unknown method");
                PendingResponse::ready(Err(ExpressPayError::NotImplemented(method.to_string())))
            }
        }
    }

    pub fn dispatch(&mut self, op: Operation, args: &MethodArgs) -> PendingResponse {
        match op {
            Operation::Initialize => {
                PendingResponse::ready(self.initialize(args.string("serverUrl")).map(|()| MethodValue::Unit))
            }
            Operation::SubmitAndCheckout => self.submit_and_checkout(args),
            Operation::Submit => self.submit(args),
            Operation::Checkout => self.checkout(),
            Operation::CheckoutWithToken => {
                self.checkout_with_token(args.string("client_token"), args.string("redirect_url"))
            }
            Operation::Query => self.query(args.string("token")),
            Operation::SetDebugMode => {
                self.set_debug_mode(args.bool("debug").unwrap_or(false));
                PendingResponse::ready(Ok(MethodValue::Unit))
            }
            Operation::GetOrderId => PendingResponse::ready(Ok(MethodValue::Text(self.order_id()))),
            Operation::GetToken => PendingResponse::ready(Ok(MethodValue::Text(self.token()))),
        }
    }

    // -- Operations --------------------------------------------------------

    /// Create the SDK session, replacing any existing one.
    ///
    /// Without a `server_url` the configured default is used.
    #[instrument(skip(self))]
    pub fn initialize(&mut self, server_url: Option<&str>) -> Result<()> {
        if !self.activity_attached {
            return Err(ExpressPayError::NoActivity);
        }
        let server_url = server_url
            .map(str::to_owned)
            .or_else(|| self.config.default_server_url.clone())
            .ok_or_else(|| ExpressPayError::InvalidArguments("Server URL is required".into()))?;

        let mut sdk = self.factory.create_session(&server_url)?;
        if self.config.debug_mode {
            sdk.set_debug_mode(true);
        }
        if self.sdk.replace(sdk).is_some() {
            debug!("previous SDK session replaced");
        }
        info!(%server_url, "ExpressPay session initialised");
        Ok(())
    }

    /// Submit the order, then run the checkout UI. Resolves when the SDK
    /// reports the payment outcome.
    pub fn submit_and_checkout(&mut self, args: &MethodArgs) -> PendingResponse {
        let Some(sdk) = self.sdk.as_mut() else {
            return not_initialized(Operation::SubmitAndCheckout);
        };

        let params = build_parameter_set(args);
        let (responder, response) = response_channel();
        let call = self.pending.arm(CheckoutKind::SubmitAndCheckout, responder);

        let tracker = self.pending.clone();
        let on_finished: PaymentCallback = Box::new(move |finished| {
            debug!(completed = finished.completed, "payment finished");
            tracker.resolve(call, Ok(MethodValue::Completion(complete(finished.into()))));
        });

        if let Err(e) = sdk.submit_and_checkout(&params, on_finished) {
            fail_checkout(&self.pending, call, e);
        }
        response
    }

    /// Submit the order only. Replies with the raw server response.
    pub fn submit(&mut self, args: &MethodArgs) -> PendingResponse {
        let Some(sdk) = self.sdk.as_mut() else {
            return not_initialized(Operation::Submit);
        };

        let params = build_parameter_set(args);
        let (responder, response) = response_channel();
        let on_finished: SubmitCallback = Box::new(move |finished| {
            debug!(has_response = finished.response.is_some(), "submit finished");
            responder.complete(complete(finished.into()));
        });

        match sdk.submit(&params, on_finished) {
            Ok(()) => response,
            Err(e) => {
                warn!(error = %e, "submit could not be started");
                PendingResponse::ready(Err(e))
            }
        }
    }

    /// Run the checkout UI for an order submitted earlier.
    pub fn checkout(&mut self) -> PendingResponse {
        let Some(sdk) = self.sdk.as_mut() else {
            return not_initialized(Operation::Checkout);
        };

        let (responder, response) = response_channel();
        let call = self.pending.arm(CheckoutKind::Checkout, responder);
        if let Err(e) = sdk.checkout() {
            fail_checkout(&self.pending, call, e);
        }
        response
    }

    /// Run the checkout UI with a token obtained outside this plugin.
    pub fn checkout_with_token(&mut self, client_token: Option<&str>, redirect_url: Option<&str>) -> PendingResponse {
        let Some(sdk) = self.sdk.as_mut() else {
            return not_initialized(Operation::CheckoutWithToken);
        };
        let Some(client_token) = client_token else {
            return PendingResponse::ready(Err(ExpressPayError::InvalidArguments(
                "Client token is required".into(),
            )));
        };

        let (responder, response) = response_channel();
        let call = self.pending.arm(CheckoutKind::CheckoutWithToken, responder);
        if let Err(e) = sdk.checkout_with_token(client_token, redirect_url) {
            fail_checkout(&self.pending, call, e);
        }
        response
    }

    /// Ask for the status of the payment behind `token`.
    pub fn query(&mut self, token: Option<&str>) -> PendingResponse {
        let Some(sdk) = self.sdk.as_mut() else {
            return not_initialized(Operation::Query);
        };
        let Some(token) = token else {
            return PendingResponse::ready(Err(ExpressPayError::InvalidArguments("Token is required".into())));
        };

        let (responder, response) = response_channel();
        let on_finished: QueryCallback = Box::new(move |finished| {
            debug!(successful = ?finished.successful, "query finished");
            responder.complete(complete(finished.into()));
        });

        match sdk.query(token, on_finished) {
            Ok(()) => response,
            Err(e) => {
                warn!(error = %e, "query could not be started");
                PendingResponse::ready(Err(e))
            }
        }
    }

    /// No-op before `initialize`.
    pub fn set_debug_mode(&mut self, debug: bool) {
        if let Some(sdk) = self.sdk.as_mut() {
            sdk.set_debug_mode(debug);
        }
    }

    pub fn order_id(&self) -> Option<String> {
        self.sdk.as_ref().and_then(|sdk| sdk.order_id())
    }

    pub fn token(&self) -> Option<String> {
        self.sdk.as_ref().and_then(|sdk| sdk.token())
    }

    // -- Host activity results ---------------------------------------------

    /// Forward a host activity result. Returns `true` when the event
    /// belonged to a pending checkout and was consumed.
    ///
    /// A result under a checkout request code other than the armed one
    /// resolves the pending caller as cancelled.
    #[instrument(skip(self, result), fields(request_code = result.request_code, result_code = result.result_code))]
    pub fn on_activity_result(&mut self, result: &ActivityResult) -> bool {
        let Some(kind) = CheckoutKind::from_request_code(result.request_code) else {
            return false;
        };
        if !self.activity_attached {
            return false;
        }
        let Some(sdk) = self.sdk.as_mut() else {
            return false;
        };
        let Some(armed) = self.pending.armed() else {
            return false;
        };

        let outcome = sdk.on_activity_result(result);
        if kind != armed.kind {
            debug!(armed = ?armed.kind, received = ?kind, "activity result for a different checkout");
            self.pending
                .resolve(armed, Ok(MethodValue::Completion(completion::cancelled())));
        } else if let Some(finished) = outcome {
            self.pending
                .resolve(armed, Ok(MethodValue::Completion(complete(finished.into()))));
        }
        true
    }
}

fn not_initialized(op: Operation) -> PendingResponse {
    debug!(%op, "rejected: SDK not initialised");
    PendingResponse::ready(Err(ExpressPayError::NotInitialized))
}

/// Resolve an armed call whose checkout flow never started.
///
/// The host sees `CHECKOUT_FAILED` carrying the underlying message as is.
fn fail_checkout(pending: &PendingCallTracker, call: ArmedCall, err: ExpressPayError) {
    warn!(kind = ?call.kind, error = %err, "checkout could not be started");
    let err = match err {
        ExpressPayError::CheckoutFailed(message) => ExpressPayError::CheckoutFailed(message),
        ExpressPayError::Bridge(message) => ExpressPayError::CheckoutFailed(Some(message)),
        other => ExpressPayError::CheckoutFailed(other.message()),
    };
    pending.resolve(call, Err(err));
}
