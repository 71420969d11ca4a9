// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ExpressPay plugin: turns host method calls into SDK invocations and the
// SDK's callbacks back into one asynchronous reply per call.

pub mod completion;
pub mod pending;
pub mod plugin;
pub mod request;
pub mod response;

pub use completion::complete;
pub use pending::{ArmedCall, PendingCallTracker};
pub use plugin::ExpressPayPlugin;
pub use request::build_parameter_set;
pub use response::{MethodResult, PendingResponse, Responder, response_channel};
