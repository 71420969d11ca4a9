// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the ExpressPay bridge.

use thiserror::Error;

/// Top-level error type for all bridge operations.
///
/// Every variant maps to a stable wire code (see [`ExpressPayError::code`])
/// that the host application receives alongside the message.
#[derive(Debug, Error)]
pub enum ExpressPayError {
    // -- Preconditions --
    #[error("ExpressPay API not initialized")]
    NotInitialized,

    #[error("{0}")]
    InvalidArguments(String),

    #[error("no host activity attached")]
    NoActivity,

    // -- SDK invocation --
    /// The SDK threw while starting a checkout flow. The message is whatever
    /// the SDK reported, which may be nothing.
    #[error("{}", .0.as_deref().unwrap_or("checkout failed"))]
    CheckoutFailed(Option<String>),

    #[error("method not implemented: {0}")]
    NotImplemented(String),

    /// The pending call was overwritten or torn down before a result arrived.
    #[error("call dropped before a result was delivered")]
    CallDropped,

    // -- Configuration --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

impl ExpressPayError {
    /// Error code reported to the host application.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::InvalidArguments(_) => "INVALID_ARGUMENTS",
            Self::NoActivity => "NO_ACTIVITY",
            Self::CheckoutFailed(_) => "CHECKOUT_FAILED",
            Self::NotImplemented(_) => "NOT_IMPLEMENTED",
            Self::CallDropped => "CALL_DROPPED",
            Self::Io(_) | Self::Serialization(_) => "CONFIG_ERROR",
            Self::Bridge(_) => "BRIDGE_ERROR",
            Self::PlatformUnavailable => "PLATFORM_UNAVAILABLE",
        }
    }

    /// Message reported to the host next to [`code`](Self::code).
    ///
    /// A `CheckoutFailed` carries the SDK's own text, so its message is
    /// absent when the SDK gave none.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::CheckoutFailed(message) => message.clone(),
            other => Some(other.to_string()),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ExpressPayError>;
