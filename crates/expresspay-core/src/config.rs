// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plugin configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// ExpressPay sandbox merchant server, used by the host glue during development.
pub const SANDBOX_SERVER_URL: &str = "https://sandbox.expresspaygh.com/api/sdk/php/server.php";

/// Settings the host application hands to the plugin at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Method channel the host binds the plugin to.
    pub channel_name: String,
    /// Server URL used by `initialize` when the call carries none.
    pub default_server_url: Option<String>,
    /// Debug flag applied to every newly created SDK session.
    pub debug_mode: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            channel_name: "com.yourapp/expresspay".into(),
            default_server_url: None,
            debug_mode: false,
        }
    }
}

impl PluginConfig {
    /// Sandbox settings: sandbox server and debug logging inside the SDK.
    pub fn sandbox() -> Self {
        Self {
            default_server_url: Some(SANDBOX_SERVER_URL.into()),
            debug_mode: true,
            ..Self::default()
        }
    }

    /// Read a JSON config file. Missing fields take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }
}
