// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android ExpressPay bridge via JNI.
//
// Requires the Android NDK and the vendor `com.expresspaygh.api` AAR on the
// host application's classpath. Each trait method invokes the corresponding
// `ExpressPayApi` method through JNI calls into the ART runtime.
//
// ## Listener shim
//
// The SDK reports completion through Java listener interfaces, which Rust
// cannot implement directly. The host application ships a small class,
// `com.expresspay.bridge.NativeListener`, that implements all three
// listener interfaces. It is constructed with a `long` handle and forwards
// every callback to the matching native method below, passing the handle
// back unchanged:
//
//   nativePaymentFinished(long handle, boolean completed, String errorMessage)
//   nativeSubmitFinished(long handle, String responseJson, String errorMessage)
//   nativeQueryFinished(long handle, Boolean successful, String responseJson, String message)
//
// JSON responses cross the boundary as `JSONObject.toString()` text. The
// handle is an id into `LISTENERS`; its first delivery claims the callback
// and any later delivery under the same id is dropped with a warning.

#![cfg(target_os = "android")]

use std::sync::OnceLock;

use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::sys::{jboolean, jlong};
use jni::{JNIEnv, JavaVM};

use expresspay_core::error::{ExpressPayError, Result};
use expresspay_core::types::{
    ActivityResult, IntentExtra, JsonObject, ParameterSet, PaymentFinished, QueryFinished, SubmitFinished,
};

use crate::listeners::ListenerRegistry;
use crate::traits::*;

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

const EXPRESSPAY_API_CLASS: &str = "com/expresspaygh/api/ExpressPayApi";
const LISTENER_CLASS: &str = "com/expresspay/bridge/NativeListener";

const PAYMENT_LISTENER_SIG: &str = "Lcom/expresspaygh/api/ExpressPayApi$ExpressPayPaymentCompletionListener;";
const SUBMIT_LISTENER_SIG: &str = "Lcom/expresspaygh/api/ExpressPayApi$ExpressPaySubmitCompletionListener;";
const QUERY_LISTENER_SIG: &str = "Lcom/expresspaygh/api/ExpressPayApi$ExpressPayQueryCompletionListener;";

static JAVA_VM: OnceLock<JavaVM> = OnceLock::new();

/// The process-wide `JavaVM`, resolved once from the NDK context.
fn java_vm() -> Result<&'static JavaVM> {
    if let Some(vm) = JAVA_VM.get() {
        return Ok(vm);
    }
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
    // The pointer is guaranteed valid for the lifetime of the process.
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| ExpressPayError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
    Ok(JAVA_VM.get_or_init(|| vm))
}

/// Obtain a [`JNIEnv`] for the current thread.
///
/// SDK listeners fire on threads the SDK owns, so threads stay attached.
fn jni_env() -> Result<JNIEnv<'static>> {
    java_vm()?
        .attach_current_thread_permanently()
        .map_err(|e| ExpressPayError::Bridge(format!("failed to attach JNI thread: {e}")))
}

/// Obtain the hosting Android `Activity` as a [`JObject`].
fn activity() -> Result<JObject<'static>> {
    let ptr = ndk_context::android_context().context();
    if ptr.is_null() {
        return Err(ExpressPayError::NoActivity);
    }
    // SAFETY: the NDK guarantees this pointer is a valid global jobject for
    // the hosting Activity.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

fn jni_err(context: &str, e: jni::errors::Error) -> ExpressPayError {
    ExpressPayError::Bridge(format!("{context}: {e}"))
}

/// Clear a pending Java exception and return its `getMessage()`.
///
/// The outer `Option` is `None` when no exception was pending.
fn take_exception(env: &mut JNIEnv<'_>) -> Option<Option<String>> {
    if !env.exception_check().unwrap_or(false) {
        return None;
    }
    let throwable = env.exception_occurred().ok();
    let _ = env.exception_clear();

    let message = throwable.and_then(|t| {
        let msg = env
            .call_method(&t, "getMessage", "()Ljava/lang/String;", &[])
            .and_then(|v| v.l())
            .ok()?;
        opt_string(env, &JString::from(msg))
    });
    Some(message)
}

/// Read a possibly-null Java string.
fn opt_string(env: &mut JNIEnv<'_>, s: &JString<'_>) -> Option<String> {
    if s.is_null() {
        return None;
    }
    env.get_string(s).ok().map(Into::into)
}

/// Parse the `JSONObject.toString()` text the listener shim forwards.
fn parse_response(json: Option<String>) -> Option<JsonObject> {
    let text = json?;
    match serde_json::from_str::<JsonObject>(&text) {
        Ok(obj) => Some(obj),
        Err(e) => {
            tracing::warn!(error = %e, "Android: SDK response is not a JSON object");
            None
        }
    }
}

/// `java.util.HashMap<String, String>` holding the request parameters.
fn params_to_hashmap<'a>(env: &mut JNIEnv<'a>, params: &ParameterSet) -> Result<JObject<'a>> {
    let map = env
        .new_object("java/util/HashMap", "()V", &[])
        .map_err(|e| jni_err("new HashMap", e))?;

    for (key, value) in params.iter() {
        let j_key = env.new_string(key).map_err(|e| jni_err("new_string(key)", e))?;
        let j_value = env.new_string(value).map_err(|e| jni_err("new_string(value)", e))?;
        env.call_method(
            &map,
            "put",
            "(Ljava/lang/Object;Ljava/lang/Object;)Ljava/lang/Object;",
            &[JValue::Object(&j_key), JValue::Object(&j_value)],
        )
        .map_err(|e| jni_err("HashMap.put", e))?;
    }
    Ok(map)
}

// ---------------------------------------------------------------------------
// Listener handles
// ---------------------------------------------------------------------------

/// Rust side of one `NativeListener` instance.
enum ListenerHandle {
    Payment(PaymentCallback),
    Submit(SubmitCallback),
    Query(QueryCallback),
}

static LISTENERS: ListenerRegistry<ListenerHandle> = ListenerRegistry::new();

/// Construct a `NativeListener` for `handle`, returning it with its id.
///
/// On failure the handle is dropped here, since Java never saw the id.
fn new_listener<'a>(env: &mut JNIEnv<'a>, handle: ListenerHandle) -> Result<(JObject<'a>, jlong)> {
    let id = LISTENERS.register(handle);
    match env.new_object(LISTENER_CLASS, "(J)V", &[JValue::Long(id)]) {
        Ok(obj) => Ok((obj, id)),
        Err(e) => {
            drop(LISTENERS.claim(id));
            Err(jni_err("new NativeListener", e))
        }
    }
}

/// Rebuild the result `android.content.Intent` from the forwarded extras.
/// Null when the host forwarded none.
fn result_intent<'a>(env: &mut JNIEnv<'a>, result: &ActivityResult) -> Result<JObject<'a>> {
    let Some(extras) = result.intent_extras() else {
        return Ok(JObject::null());
    };
    let intent = env
        .new_object("android/content/Intent", "()V", &[])
        .map_err(|e| jni_err("new Intent", e))?;

    for (key, extra) in &extras {
        let j_key = env.new_string(key).map_err(|e| jni_err("new_string(extra key)", e))?;
        let call = match extra {
            IntentExtra::Text(text) => {
                let j_text = env.new_string(text).map_err(|e| jni_err("new_string(extra)", e))?;
                env.call_method(
                    &intent,
                    "putExtra",
                    "(Ljava/lang/String;Ljava/lang/String;)Landroid/content/Intent;",
                    &[JValue::Object(&j_key), JValue::Object(&j_text)],
                )
            }
            IntentExtra::Bool(b) => env.call_method(
                &intent,
                "putExtra",
                "(Ljava/lang/String;Z)Landroid/content/Intent;",
                &[JValue::Object(&j_key), JValue::Bool(u8::from(*b))],
            ),
            IntentExtra::Long(n) => env.call_method(
                &intent,
                "putExtra",
                "(Ljava/lang/String;J)Landroid/content/Intent;",
                &[JValue::Object(&j_key), JValue::Long(*n)],
            ),
            IntentExtra::Double(n) => env.call_method(
                &intent,
                "putExtra",
                "(Ljava/lang/String;D)Landroid/content/Intent;",
                &[JValue::Object(&j_key), JValue::Double(*n)],
            ),
        };
        call.map_err(|e| jni_err("Intent.putExtra", e))?;
    }
    tracing::debug!(extras = extras.len(), "Android: result intent rebuilt");
    Ok(intent)
}

// ---------------------------------------------------------------------------
// Factory and session
// ---------------------------------------------------------------------------

/// Creates `ExpressPayApi` instances bound to the hosting Activity.
pub struct AndroidSdkFactory;

impl AndroidSdkFactory {
    /// This does **not** touch JNI; the first JNI call happens when a
    /// session is created.
    pub fn new() -> Self {
        Self
    }
}

impl Default for AndroidSdkFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SdkFactory for AndroidSdkFactory {
    fn platform_name(&self) -> &str {
        "Android"
    }

    fn create_session(&self, server_url: &str) -> Result<Box<dyn PaymentSdk>> {
        let mut env = jni_env()?;
        let activity = activity()?;

        let j_url = env
            .new_string(server_url)
            .map_err(|e| jni_err("new_string(serverUrl)", e))?;

        let api = env
            .new_object(
                EXPRESSPAY_API_CLASS,
                "(Landroid/content/Context;Ljava/lang/String;)V",
                &[JValue::Object(&activity), JValue::Object(&j_url)],
            )
            .map_err(|e| jni_err("new ExpressPayApi", e))?;

        let api = env
            .new_global_ref(api)
            .map_err(|e| jni_err("new_global_ref(ExpressPayApi)", e))?;

        tracing::info!(server_url, "Android: ExpressPayApi session created");
        Ok(Box::new(AndroidExpressPay {
            api,
            listenerless_checkout: false,
        }))
    }
}

/// One `ExpressPayApi` instance, pinned by a JNI global reference.
pub struct AndroidExpressPay {
    api: GlobalRef,
    /// Set while a `checkout` launched without a listener is on screen. Its
    /// outcome is only visible as the activity result code.
    listenerless_checkout: bool,
}

impl AndroidExpressPay {
    /// Call a `String` getter, mapping null and JNI failures to `None`.
    fn string_getter(&self, method: &str) -> Option<String> {
        let mut env = jni_env().ok()?;
        let value = env
            .call_method(self.api.as_obj(), method, "()Ljava/lang/String;", &[])
            .and_then(|v| v.l());
        match value {
            Ok(obj) => opt_string(&mut env, &JString::from(obj)),
            Err(e) => {
                let _ = take_exception(&mut env);
                tracing::warn!(method, error = %e, "Android: ExpressPayApi getter failed");
                None
            }
        }
    }

    /// Invoke a method that launches a checkout activity. A thrown exception
    /// becomes `CheckoutFailed` carrying the exception message.
    fn launch_checkout(&self, name: &str, sig: &str, args: &[JValue<'_, '_>]) -> Result<()> {
        let mut env = jni_env()?;
        match env.call_method(self.api.as_obj(), name, sig, args) {
            Ok(_) => Ok(()),
            Err(e) => match take_exception(&mut env) {
                Some(message) => Err(ExpressPayError::CheckoutFailed(message)),
                None => Err(jni_err(name, e)),
            },
        }
    }
}

impl PaymentSdk for AndroidExpressPay {
    fn set_debug_mode(&mut self, debug: bool) {
        let result = jni_env().and_then(|mut env| {
            env.call_method(
                self.api.as_obj(),
                "setDebugMode",
                "(Z)V",
                &[JValue::Bool(debug as jboolean)],
            )
            .map(|_| ())
            .map_err(|e| jni_err("setDebugMode", e))
        });
        if let Err(e) = result {
            tracing::warn!(error = %e, "Android: setDebugMode failed");
        }
    }

    fn order_id(&self) -> Option<String> {
        self.string_getter("getOrderId")
    }

    fn token(&self) -> Option<String> {
        self.string_getter("getToken")
    }

    fn submit_and_checkout(&mut self, params: &ParameterSet, on_finished: PaymentCallback) -> Result<()> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let map = params_to_hashmap(&mut env, params)?;
        let (listener, id) = new_listener(&mut env, ListenerHandle::Payment(on_finished))?;
        self.listenerless_checkout = false;

        tracing::info!(params = params.len(), "Android: submitAndCheckout");

        let sig = format!("(Ljava/util/HashMap;Landroid/app/Activity;{PAYMENT_LISTENER_SIG})V");
        let call = env.call_method(
            self.api.as_obj(),
            "submitAndCheckout",
            &sig,
            &[JValue::Object(&map), JValue::Object(&activity), JValue::Object(&listener)],
        );
        if let Err(e) = call {
            let message = take_exception(&mut env).flatten();
            drop(LISTENERS.claim(id));
            return Err(ExpressPayError::CheckoutFailed(message.or_else(|| Some(e.to_string()))));
        }
        Ok(())
    }

    fn submit(&mut self, params: &ParameterSet, on_finished: SubmitCallback) -> Result<()> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let map = params_to_hashmap(&mut env, params)?;
        let (listener, id) = new_listener(&mut env, ListenerHandle::Submit(on_finished))?;

        tracing::info!(params = params.len(), "Android: submit");

        let sig = format!("(Ljava/util/HashMap;Landroid/app/Activity;{SUBMIT_LISTENER_SIG})V");
        let call = env.call_method(
            self.api.as_obj(),
            "submit",
            &sig,
            &[JValue::Object(&map), JValue::Object(&activity), JValue::Object(&listener)],
        );
        if let Err(e) = call {
            let message = take_exception(&mut env).flatten();
            drop(LISTENERS.claim(id));
            return Err(ExpressPayError::Bridge(format!(
                "submit: {}",
                message.unwrap_or_else(|| e.to_string())
            )));
        }
        Ok(())
    }

    fn checkout(&mut self) -> Result<()> {
        let activity = activity()?;
        tracing::info!("Android: checkout");
        self.launch_checkout("checkout", "(Landroid/app/Activity;)V", &[JValue::Object(&activity)])?;
        self.listenerless_checkout = true;
        Ok(())
    }

    fn checkout_with_token(&mut self, token: &str, redirect_url: Option<&str>) -> Result<()> {
        let mut env = jni_env()?;
        let activity = activity()?;

        let j_token = env
            .new_string(token)
            .map_err(|e| jni_err("new_string(token)", e))?;
        let j_redirect: JObject = match redirect_url {
            Some(url) => env
                .new_string(url)
                .map_err(|e| jni_err("new_string(redirectUrl)", e))?
                .into(),
            None => JObject::null(),
        };

        tracing::info!(has_redirect = redirect_url.is_some(), "Android: checkout with token");
        self.launch_checkout(
            "checkout",
            "(Landroid/app/Activity;Ljava/lang/String;Ljava/lang/String;)V",
            &[
                JValue::Object(&activity),
                JValue::Object(&j_token),
                JValue::Object(&j_redirect),
            ],
        )?;
        self.listenerless_checkout = true;
        Ok(())
    }

    fn query(&mut self, token: &str, on_finished: QueryCallback) -> Result<()> {
        let mut env = jni_env()?;
        let j_token = env
            .new_string(token)
            .map_err(|e| jni_err("new_string(token)", e))?;
        let (listener, id) = new_listener(&mut env, ListenerHandle::Query(on_finished))?;

        tracing::info!("Android: query");

        let sig = format!("(Ljava/lang/String;{QUERY_LISTENER_SIG})V");
        let call = env.call_method(
            self.api.as_obj(),
            "query",
            &sig,
            &[JValue::Object(&j_token), JValue::Object(&listener)],
        );
        if let Err(e) = call {
            let message = take_exception(&mut env).flatten();
            drop(LISTENERS.claim(id));
            return Err(ExpressPayError::Bridge(format!(
                "query: {}",
                message.unwrap_or_else(|| e.to_string())
            )));
        }
        Ok(())
    }

    /// After `submitAndCheckout` the SDK answers through the registered
    /// listener, so nothing is returned here. A listenerless `checkout` is
    /// reported from the activity result code instead.
    ///
    /// The SDK reads the outcome from the result `Intent`, rebuilt here from
    /// the extras the host forwarded in `result.data`.
    fn on_activity_result(&mut self, result: &ActivityResult) -> Option<PaymentFinished> {
        let outcome = jni_env().and_then(|mut env| {
            let activity = activity()?;
            let intent = result_intent(&mut env, result)?;
            env.call_method(
                self.api.as_obj(),
                "onActivityResult",
                "(Landroid/app/Activity;IILandroid/content/Intent;)V",
                &[
                    JValue::Object(&activity),
                    JValue::Int(result.request_code),
                    JValue::Int(result.result_code),
                    JValue::Object(&intent),
                ],
            )
            .map(|_| ())
            .map_err(|e| {
                let _ = take_exception(&mut env);
                jni_err("onActivityResult", e)
            })
        });
        if let Err(e) = outcome {
            tracing::warn!(request_code = result.request_code, error = %e, "Android: onActivityResult failed");
        }

        if !std::mem::take(&mut self.listenerless_checkout) {
            return None;
        }
        Some(PaymentFinished {
            completed: result.is_ok(),
            error_message: (!result.is_ok()).then(|| "Payment cancelled".to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Native entry points for the listener shim
// ---------------------------------------------------------------------------

/// Take the callback registered under `handle`. Repeated and unknown
/// handles yield `None`.
fn claim(handle: jlong, expected: &str) -> Option<ListenerHandle> {
    let listener = LISTENERS.claim(handle);
    if listener.is_none() {
        tracing::warn!(expected, handle, "Android: listener result ignored");
    }
    listener
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_expresspay_bridge_NativeListener_nativePaymentFinished(
    mut env: JNIEnv,
    _this: JObject,
    handle: jlong,
    completed: jboolean,
    error_message: JString,
) {
    let Some(listener) = claim(handle, "payment") else { return };
    let finished = PaymentFinished {
        completed: completed != 0,
        error_message: opt_string(&mut env, &error_message),
    };
    match listener {
        ListenerHandle::Payment(cb) => cb(finished),
        _ => tracing::warn!("Android: payment result delivered to a non-payment listener"),
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_expresspay_bridge_NativeListener_nativeSubmitFinished(
    mut env: JNIEnv,
    _this: JObject,
    handle: jlong,
    response_json: JString,
    error_message: JString,
) {
    let Some(listener) = claim(handle, "submit") else { return };
    let finished = SubmitFinished {
        response: parse_response(opt_string(&mut env, &response_json)),
        error_message: opt_string(&mut env, &error_message),
    };
    match listener {
        ListenerHandle::Submit(cb) => cb(finished),
        _ => tracing::warn!("Android: submit result delivered to a non-submit listener"),
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_expresspay_bridge_NativeListener_nativeQueryFinished(
    mut env: JNIEnv,
    _this: JObject,
    handle: jlong,
    successful: JObject,
    response_json: JString,
    message: JString,
) {
    let Some(listener) = claim(handle, "query") else { return };

    // `successful` is a nullable java.lang.Boolean.
    let successful = if successful.is_null() {
        None
    } else {
        env.call_method(&successful, "booleanValue", "()Z", &[])
            .and_then(|v| v.z())
            .ok()
    };

    let finished = QueryFinished {
        successful,
        response: parse_response(opt_string(&mut env, &response_json)),
        message: opt_string(&mut env, &message),
    };
    match listener {
        ListenerHandle::Query(cb) => cb(finished),
        _ => tracing::warn!("Android: query result delivered to a non-query listener"),
    }
}
