// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! ExpressPay native SDK bridge abstractions.
//!
//! This crate defines the [`traits::PaymentSdk`] seam the plugin drives and
//! the platform dispatch that picks an implementation. On Android the vendor
//! `ExpressPayApi` is reached through JNI; everywhere else a stub reports
//! `PlatformUnavailable`.

pub mod listeners;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

/// Retrieves the session factory for the target operating system.
pub fn platform_sdk_factory() -> Box<dyn traits::SdkFactory> {
    #[cfg(target_os = "android")]
    {
        // Android: Uses `jni-rs` to construct and drive `ExpressPayApi`.
        Box::new(android::AndroidSdkFactory::new())
    }
    #[cfg(not(target_os = "android"))]
    {
        // DESKTOP/CI: no vendor SDK exists; every session request fails.
        Box::new(stub::StubSdkFactory)
    }
}
