// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scripted SDK used by the plugin integration tests. It records every call
// and parks the callbacks it receives so a test can fire them later.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use expresspay_bridge::traits::{PaymentCallback, PaymentSdk, QueryCallback, SdkFactory, SubmitCallback};
use expresspay_core::PluginConfig;
use expresspay_core::error::{ExpressPayError, Result};
use expresspay_core::types::{ActivityResult, ParameterSet, PaymentFinished, QueryFinished, SubmitFinished};
use expresspay_plugin::ExpressPayPlugin;

#[derive(Default)]
struct State {
    calls: Vec<String>,
    sessions: Vec<String>,
    params: Vec<ParameterSet>,
    debug: Option<bool>,
    order_id: Option<String>,
    token: Option<String>,
    checkout_error: Option<ExpressPayError>,
    submit_error: Option<ExpressPayError>,
    query_error: Option<ExpressPayError>,
    activity_outcome: Option<PaymentFinished>,
    activity_results: Vec<ActivityResult>,
    payment: Vec<PaymentCallback>,
    submit: Vec<SubmitCallback>,
    query: Vec<QueryCallback>,
}

/// Shared view of everything the scripted SDK saw.
#[derive(Clone, Default)]
pub struct Script(Arc<Mutex<State>>);

impl Script {
    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.0.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn sessions(&self) -> Vec<String> {
        self.state().sessions.clone()
    }

    pub fn last_params(&self) -> Option<ParameterSet> {
        self.state().params.last().cloned()
    }

    pub fn debug(&self) -> Option<bool> {
        self.state().debug
    }

    pub fn activity_results(&self) -> Vec<ActivityResult> {
        self.state().activity_results.clone()
    }

    pub fn set_ids(&self, order_id: &str, token: &str) {
        let mut state = self.state();
        state.order_id = Some(order_id.into());
        state.token = Some(token.into());
    }

    /// Make the next checkout launch fail synchronously.
    pub fn fail_next_checkout(&self, err: ExpressPayError) {
        self.state().checkout_error = Some(err);
    }

    /// Make the next `submit` or `submitAndCheckout` fail synchronously.
    pub fn fail_next_submit(&self, err: ExpressPayError) {
        self.state().submit_error = Some(err);
    }

    pub fn fail_next_query(&self, err: ExpressPayError) {
        self.state().query_error = Some(err);
    }

    /// Outcome the SDK reports from the next activity result.
    pub fn report_on_activity_result(&self, finished: PaymentFinished) {
        self.state().activity_outcome = Some(finished);
    }

    /// Fire the oldest parked payment callback. Returns false if none.
    pub fn fire_payment(&self, finished: PaymentFinished) -> bool {
        let cb = {
            let mut state = self.state();
            if state.payment.is_empty() { None } else { Some(state.payment.remove(0)) }
        };
        cb.map(|cb| cb(finished)).is_some()
    }

    pub fn fire_submit(&self, finished: SubmitFinished) -> bool {
        let cb = {
            let mut state = self.state();
            if state.submit.is_empty() { None } else { Some(state.submit.remove(0)) }
        };
        cb.map(|cb| cb(finished)).is_some()
    }

    pub fn fire_query(&self, finished: QueryFinished) -> bool {
        let cb = {
            let mut state = self.state();
            if state.query.is_empty() { None } else { Some(state.query.remove(0)) }
        };
        cb.map(|cb| cb(finished)).is_some()
    }

    pub fn take_submit(&self) -> Option<SubmitCallback> {
        let mut state = self.state();
        if state.submit.is_empty() { None } else { Some(state.submit.remove(0)) }
    }
}

pub struct ScriptedSdk {
    script: Script,
}

impl ScriptedSdk {
    fn record(&self, call: &str) {
        self.script.state().calls.push(call.to_string());
    }
}

impl PaymentSdk for ScriptedSdk {
    fn set_debug_mode(&mut self, debug: bool) {
        self.record("setDebugMode");
        self.script.state().debug = Some(debug);
    }

    fn order_id(&self) -> Option<String> {
        self.script.state().order_id.clone()
    }

    fn token(&self) -> Option<String> {
        self.script.state().token.clone()
    }

    fn submit_and_checkout(&mut self, params: &ParameterSet, on_finished: PaymentCallback) -> Result<()> {
        self.record("submitAndCheckout");
        let mut state = self.script.state();
        state.params.push(params.clone());
        if let Some(err) = state.submit_error.take() {
            return Err(err);
        }
        state.payment.push(on_finished);
        Ok(())
    }

    fn submit(&mut self, params: &ParameterSet, on_finished: SubmitCallback) -> Result<()> {
        self.record("submit");
        let mut state = self.script.state();
        state.params.push(params.clone());
        if let Some(err) = state.submit_error.take() {
            return Err(err);
        }
        state.submit.push(on_finished);
        Ok(())
    }

    fn checkout(&mut self) -> Result<()> {
        self.record("checkout");
        match self.script.state().checkout_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn checkout_with_token(&mut self, token: &str, redirect_url: Option<&str>) -> Result<()> {
        self.record(&format!("checkoutWithToken:{token}:{}", redirect_url.unwrap_or("-")));
        match self.script.state().checkout_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn query(&mut self, token: &str, on_finished: QueryCallback) -> Result<()> {
        self.record(&format!("query:{token}"));
        let mut state = self.script.state();
        if let Some(err) = state.query_error.take() {
            return Err(err);
        }
        state.query.push(on_finished);
        Ok(())
    }

    fn on_activity_result(&mut self, result: &ActivityResult) -> Option<PaymentFinished> {
        self.record("onActivityResult");
        let mut state = self.script.state();
        state.activity_results.push(result.clone());
        state.activity_outcome.take()
    }
}

pub struct ScriptedFactory {
    script: Script,
}

impl SdkFactory for ScriptedFactory {
    fn platform_name(&self) -> &str {
        "Scripted"
    }

    fn create_session(&self, server_url: &str) -> Result<Box<dyn PaymentSdk>> {
        self.script.state().sessions.push(server_url.to_string());
        Ok(Box::new(ScriptedSdk {
            script: self.script.clone(),
        }))
    }
}

pub const SERVER_URL: &str = "https://merchant.example.test/server.php";

/// Plugin with an attached activity but no session yet.
pub fn plugin_with(config: PluginConfig) -> (ExpressPayPlugin, Script) {
    let script = Script::default();
    let factory = ScriptedFactory {
        script: script.clone(),
    };
    let mut plugin = ExpressPayPlugin::new(config, Box::new(factory));
    plugin.attach_activity();
    (plugin, script)
}

/// Plugin with an attached activity and an initialised session.
pub fn initialised_plugin() -> (ExpressPayPlugin, Script) {
    let (mut plugin, script) = plugin_with(PluginConfig::default());
    plugin.initialize(Some(SERVER_URL)).unwrap();
    (plugin, script)
}

pub fn json_object(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}
