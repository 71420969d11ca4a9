// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Completion bridge: every SDK callback shape folds into one CompletionResult.

use expresspay_core::types::{
    CompletionResult, JsonObject, PaymentFinished, QueryFinished, SdkNotification, SubmitFinished,
};

pub const PAYMENT_COMPLETED_MESSAGE: &str = "Payment completed successfully";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";
pub const CANCELLED_MESSAGE: &str = "Payment cancelled or failed";

/// Normalise any SDK notification.
pub fn complete(notification: SdkNotification) -> CompletionResult {
    match notification {
        SdkNotification::Payment(p) => payment_finished(p),
        SdkNotification::Submit(s) => submit_finished(s),
        SdkNotification::Query(q) => query_finished(q),
    }
}

/// The message is the SDK's error text even when `completed` is true.
fn payment_finished(p: PaymentFinished) -> CompletionResult {
    CompletionResult {
        success: p.completed,
        message: Some(p.error_message.unwrap_or_else(|| PAYMENT_COMPLETED_MESSAGE.into())),
        data: None,
    }
}

/// A response body means success, whatever the error text says.
fn submit_finished(s: SubmitFinished) -> CompletionResult {
    match s.response {
        Some(body) => CompletionResult {
            success: true,
            message: None,
            data: Some(stringify(body)),
        },
        None => CompletionResult {
            success: false,
            message: Some(s.error_message.unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.into())),
            data: None,
        },
    }
}

fn query_finished(q: QueryFinished) -> CompletionResult {
    CompletionResult {
        success: q.successful.unwrap_or(false),
        message: q.message,
        data: q.response.map(stringify),
    }
}

/// Result for a checkout whose activity came back under another request code.
pub fn cancelled() -> CompletionResult {
    CompletionResult {
        success: false,
        message: Some(CANCELLED_MESSAGE.into()),
        data: None,
    }
}

fn stringify(body: JsonObject) -> String {
    serde_json::Value::Object(body).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: serde_json::Value) -> JsonObject {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn payment_completed_gets_default_message() {
        let result = complete(
            PaymentFinished {
                completed: true,
                error_message: None,
            }
            .into(),
        );
        assert!(result.success);
        assert_eq!(result.message.as_deref(), Some(PAYMENT_COMPLETED_MESSAGE));
        assert_eq!(result.data, None);
    }

    #[test]
    fn payment_declined_keeps_sdk_message() {
        let result = complete(
            PaymentFinished {
                completed: false,
                error_message: Some("Card declined".into()),
            }
            .into(),
        );
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("Card declined"));
    }

    #[test]
    fn submit_with_body_is_success() {
        let result = complete(
            SubmitFinished {
                response: Some(object(json!({"token": "abc"}))),
                error_message: None,
            }
            .into(),
        );
        assert_eq!(
            result,
            CompletionResult {
                success: true,
                message: None,
                data: Some(r#"{"token":"abc"}"#.into()),
            }
        );
    }

    #[test]
    fn submit_body_keeps_field_order() {
        let body = object(json!({"status": 1, "token": "abc", "order-id": "ORD-9"}));
        let result = complete(
            SubmitFinished {
                response: Some(body),
                error_message: Some("ignored".into()),
            }
            .into(),
        );
        assert!(result.success);
        assert_eq!(result.data.as_deref(), Some(r#"{"status":1,"token":"abc","order-id":"ORD-9"}"#));
    }

    #[test]
    fn submit_without_body_reports_error() {
        let result = complete(
            SubmitFinished {
                response: None,
                error_message: Some("timeout".into()),
            }
            .into(),
        );
        assert_eq!(
            result,
            CompletionResult {
                success: false,
                message: Some("timeout".into()),
                data: None,
            }
        );

        let result = complete(
            SubmitFinished {
                response: None,
                error_message: None,
            }
            .into(),
        );
        assert_eq!(result.message.as_deref(), Some(UNKNOWN_ERROR_MESSAGE));
    }

    #[test]
    fn query_unknown_status_is_failure() {
        let result = complete(
            QueryFinished {
                successful: None,
                response: Some(object(json!({"status": "paid"}))),
                message: None,
            }
            .into(),
        );
        assert_eq!(
            result,
            CompletionResult {
                success: false,
                message: None,
                data: Some(r#"{"status":"paid"}"#.into()),
            }
        );
    }

    #[test]
    fn query_passes_message_through() {
        let result = complete(
            QueryFinished {
                successful: Some(true),
                response: None,
                message: Some("Approved".into()),
            }
            .into(),
        );
        assert!(result.success);
        assert_eq!(result.data, None);
        assert_eq!(result.message.as_deref(), Some("Approved"));
    }

    #[test]
    fn cancellation_result() {
        let result = cancelled();
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some(CANCELLED_MESSAGE));
    }
}
