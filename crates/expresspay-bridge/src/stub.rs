// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub factory for desktop/CI builds where the vendor SDK is unavailable.

use expresspay_core::error::{ExpressPayError, Result};

use crate::traits::{PaymentSdk, SdkFactory};

/// Factory returned on non-Android platforms. It never creates a session.
pub struct StubSdkFactory;

impl SdkFactory for StubSdkFactory {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }

    fn create_session(&self, server_url: &str) -> Result<Box<dyn PaymentSdk>> {
        tracing::warn!(server_url, "SdkFactory::create_session called on stub factory");
        Err(ExpressPayError::PlatformUnavailable)
    }
}
