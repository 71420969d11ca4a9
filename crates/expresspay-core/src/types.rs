// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the ExpressPay bridge.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON object as handed back by the SDK.
pub type JsonObject = Map<String, Value>;

/// Request keys understood by the ExpressPay SDK.
///
/// Declaration order is the iteration order of a [`ParameterSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKey {
    Currency,
    Amount,
    OrderId,
    OrderDesc,
    AccountNumber,
    Email,
    RedirectUrl,
    OrderImgUrl,
    FirstName,
    LastName,
    PhoneNumber,
}

impl ParamKey {
    /// Every recognised key, in declaration order.
    pub const ALL: [ParamKey; 11] = [
        Self::Currency,
        Self::Amount,
        Self::OrderId,
        Self::OrderDesc,
        Self::AccountNumber,
        Self::Email,
        Self::RedirectUrl,
        Self::OrderImgUrl,
        Self::FirstName,
        Self::LastName,
        Self::PhoneNumber,
    ];

    /// Wire name used both in method-call arguments and in the SDK request map.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Currency => "currency",
            Self::Amount => "amount",
            Self::OrderId => "order_id",
            Self::OrderDesc => "order_desc",
            Self::AccountNumber => "account_number",
            Self::Email => "email",
            Self::RedirectUrl => "redirect_url",
            Self::OrderImgUrl => "order_img_url",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::PhoneNumber => "phone_number",
        }
    }

    /// Look up a key by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalised request payload sent to the SDK.
///
/// Only keys that were present in the call arguments appear; there are no
/// null or defaulted entries. The set has no mutators once collected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet(BTreeMap<ParamKey, String>);

impl ParameterSet {
    pub fn get(&self, key: ParamKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: ParamKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries as `(wire name, value)` pairs, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = ParamKey> + '_ {
        self.0.keys().copied()
    }
}

impl FromIterator<(ParamKey, String)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (ParamKey, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Loosely-typed named arguments of an incoming method call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodArgs(JsonObject);

impl MethodArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value. Anything other than an object yields an empty bag,
    /// the same as a call made without arguments.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Builder-style insert, mostly for host glue and tests.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String argument; `None` when absent, null, or not a string.
    pub fn string(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Boolean argument; `None` when absent, null, or not a boolean.
    pub fn bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }
}

impl From<JsonObject> for MethodArgs {
    fn from(map: JsonObject) -> Self {
        Self(map)
    }
}

/// Uniform result delivered to the host for every payment outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub success: bool,
    pub message: Option<String>,
    /// Raw JSON text of the SDK response, when there is one.
    pub data: Option<String>,
}

/// `ExpressPayPaymentCompletionListener.onExpressPayPaymentFinished`.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentFinished {
    pub completed: bool,
    pub error_message: Option<String>,
}

/// `ExpressPaySubmitCompletionListener.onExpressPaySubmitFinished`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitFinished {
    pub response: Option<JsonObject>,
    pub error_message: Option<String>,
}

/// `ExpressPayQueryCompletionListener.onExpressPayQueryFinished`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFinished {
    /// Tri-state: the SDK reports `None` when the status is unknown.
    pub successful: Option<bool>,
    pub response: Option<JsonObject>,
    pub message: Option<String>,
}

/// Any completion signal the SDK can raise.
#[derive(Debug, Clone, PartialEq)]
pub enum SdkNotification {
    Payment(PaymentFinished),
    Submit(SubmitFinished),
    Query(QueryFinished),
}

impl From<PaymentFinished> for SdkNotification {
    fn from(p: PaymentFinished) -> Self {
        Self::Payment(p)
    }
}

impl From<SubmitFinished> for SdkNotification {
    fn from(s: SubmitFinished) -> Self {
        Self::Submit(s)
    }
}

impl From<QueryFinished> for SdkNotification {
    fn from(q: QueryFinished) -> Self {
        Self::Query(q)
    }
}

/// Checkout-family operations, i.e. those resolved through the pending-call
/// slot rather than a direct callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckoutKind {
    SubmitAndCheckout,
    Checkout,
    CheckoutWithToken,
}

impl CheckoutKind {
    pub const ALL: [CheckoutKind; 3] = [
        Self::SubmitAndCheckout,
        Self::Checkout,
        Self::CheckoutWithToken,
    ];

    /// Request code the SDK launches its checkout activity with.
    pub fn request_code(&self) -> i32 {
        match self {
            Self::SubmitAndCheckout => 1001,
            Self::Checkout => 1002,
            Self::CheckoutWithToken => 1003,
        }
    }

    pub fn from_request_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.request_code() == code)
    }
}

/// Named operations reachable over the method channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Initialize,
    SubmitAndCheckout,
    Submit,
    Checkout,
    CheckoutWithToken,
    Query,
    SetDebugMode,
    GetOrderId,
    GetToken,
}

impl Operation {
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::SubmitAndCheckout => "submitAndCheckout",
            Self::Submit => "submit",
            Self::Checkout => "checkout",
            Self::CheckoutWithToken => "checkoutWithToken",
            Self::Query => "query",
            Self::SetDebugMode => "setDebugMode",
            Self::GetOrderId => "getOrderId",
            Self::GetToken => "getToken",
        }
    }

    pub fn from_method(name: &str) -> Option<Self> {
        Some(match name {
            "initialize" => Self::Initialize,
            "submitAndCheckout" => Self::SubmitAndCheckout,
            "submit" => Self::Submit,
            "checkout" => Self::Checkout,
            "checkoutWithToken" => Self::CheckoutWithToken,
            "query" => Self::Query,
            "setDebugMode" => Self::SetDebugMode,
            "getOrderId" => Self::GetOrderId,
            "getToken" => Self::GetToken,
            _ => return None,
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method_name())
    }
}

/// Android `Activity.RESULT_OK`.
pub const RESULT_OK: i32 = -1;
/// Android `Activity.RESULT_CANCELED`.
pub const RESULT_CANCELED: i32 = 0;

/// Host-level activity result forwarded by the embedding application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityResult {
    pub request_code: i32,
    pub result_code: i32,
    /// Extras of the result `Intent` as a JSON object, if the host
    /// forwarded them. The SDK reads the checkout outcome from these.
    pub data: Option<Value>,
}

/// One extra of a result `Intent`, typed the way `Intent.putExtra` takes it.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentExtra {
    Text(String),
    Bool(bool),
    Long(i64),
    Double(f64),
}

impl From<&Value> for IntentExtra {
    /// Arrays and nested objects travel as their JSON text.
    fn from(value: &Value) -> Self {
        match value {
            Value::Bool(b) => Self::Bool(*b),
            Value::String(s) => Self::Text(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Long(i),
                None => Self::Double(n.as_f64().unwrap_or_default()),
            },
            other => Self::Text(other.to_string()),
        }
    }
}

impl ActivityResult {
    pub fn new(request_code: i32, result_code: i32) -> Self {
        Self {
            request_code,
            result_code,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.result_code == RESULT_OK
    }

    /// Extras to rebuild the result `Intent` from, in the host's key order.
    ///
    /// `None` when no intent was forwarded or `data` is not an object. Null
    /// values are skipped, as an absent extra reads the same on the SDK side.
    pub fn intent_extras(&self) -> Option<Vec<(String, IntentExtra)>> {
        let Some(Value::Object(map)) = &self.data else {
            return None;
        };
        Some(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), IntentExtra::from(v)))
                .collect(),
        )
    }
}

/// Successful reply to a method call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodValue {
    /// `null` on the host side.
    Unit,
    Completion(CompletionResult),
    Text(Option<String>),
}
