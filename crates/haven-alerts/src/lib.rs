//! Outbound alert dispatch for Haven escalations.
//!
//! Resolved alert channels are executed here: guardian SMS through a
//! Twilio-style provider, emergency-services and company-HR channels as
//! logged-only records. Every dispatch attempt produces exactly one immutable
//! outcome record, and per-channel failures never abort the remaining
//! channels. The outbox decouples sends from the triggering request so a
//! cancelled request never cancels an in-flight alert.

pub mod alert_contract;
pub mod alert_gateway;
pub mod alert_outbox;
pub mod alert_sms;

pub use alert_contract::*;
pub use alert_gateway::*;
pub use alert_outbox::*;
pub use alert_sms::*;
