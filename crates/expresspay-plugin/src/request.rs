// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request adapter: method-call arguments to the SDK's request parameters.

use expresspay_core::types::{MethodArgs, ParamKey, ParameterSet};
use tracing::debug;

/// Collect the recognised request keys from `args`.
///
/// Unrecognised keys are dropped and absent keys stay absent. Values are
/// passed through untouched; the SDK owns format validation (an `amount`
/// of `"abc"` goes through as-is). A recognised key holding a non-string
/// value is treated as absent.
pub fn build_parameter_set(args: &MethodArgs) -> ParameterSet {
    ParamKey::ALL
        .into_iter()
        .filter_map(|key| match args.value(key.as_str()) {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some((key, s.clone())),
            Some(other) => {
                debug!(key = key.as_str(), value = %other, "ignoring non-string request parameter");
                None
            }
        })
        .collect()
}
