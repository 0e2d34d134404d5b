use anyhow::Result;
use serde::{Deserialize, Serialize};

use haven_risk::RiskTier;

pub const ALERT_REASON_SMS_NOT_CONFIGURED: &str = "sms_not_configured";
pub const ALERT_REASON_SMS_INVALID_RECIPIENT: &str = "sms_invalid_recipient";
pub const ALERT_REASON_SMS_PROVIDER_REJECTED: &str = "sms_provider_rejected";
pub const ALERT_REASON_SMS_TRANSPORT_FAILED: &str = "sms_transport_failed";
pub const ALERT_REASON_NO_CHANNEL_CONFIGURED: &str = "alert_no_channel_configured";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "channel", rename_all = "snake_case")]
/// A resolved outbound channel with the context its send needs.
pub enum AlertChannel {
    GuardianSms { phone: String },
    EmergencyServices,
    CompanyHr { company_name: String },
}

impl AlertChannel {
    pub fn kind(&self) -> AlertChannelKind {
        match self {
            Self::GuardianSms { .. } => AlertChannelKind::GuardianSms,
            Self::EmergencyServices => AlertChannelKind::EmergencyServices,
            Self::CompanyHr { .. } => AlertChannelKind::CompanyHr,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `AlertChannelKind` values.
pub enum AlertChannelKind {
    GuardianSms,
    EmergencyServices,
    CompanyHr,
    /// Synthetic recipient recorded when a protocol demanded an alert but no
    /// channel was configured; keeps the audit trail free of silent drops.
    Unconfigured,
}

impl AlertChannelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GuardianSms => "guardian_sms",
            Self::EmergencyServices => "emergency_services",
            Self::CompanyHr => "company_hr",
            Self::Unconfigured => "unconfigured",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `AlertDeliveryStatus` values.
pub enum AlertDeliveryStatus {
    Sent,
    Failed,
    Logged,
}

impl AlertDeliveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Logged => "logged",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Immutable outcome of one dispatch attempt; one record per attempt, so
/// repeated crises produce repeated records.
pub struct AlertOutcomeRecord {
    pub user_id: String,
    pub recipient_type: AlertChannelKind,
    pub status: AlertDeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub timestamp_unix_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Unit of work handed to the alert outbox.
pub struct AlertDispatchJob {
    pub user_id: String,
    pub tier: RiskTier,
    pub channels: Vec<AlertChannel>,
    pub message: String,
}

/// Durable destination for alert outcomes. The outbox worker records through
/// this seam so gateway code stays storage-agnostic.
pub trait AlertOutcomeSink: Send + Sync {
    fn record_alert_outcome(&self, record: &AlertOutcomeRecord) -> Result<()>;
}
