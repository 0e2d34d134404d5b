//! Escalation policy and dispatch runtime for Haven.
//!
//! Maps an assessment tier to its intervention protocol, resolves the
//! account-specific alert channels, and drives the best-effort dispatch state
//! machine with write-ahead audit logging.

pub mod escalation_dispatch;
pub mod escalation_protocol;
pub mod escalation_store;

pub use escalation_dispatch::*;
pub use escalation_protocol::*;
pub use escalation_store::*;
