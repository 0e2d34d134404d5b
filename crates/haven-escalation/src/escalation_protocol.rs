//! Static tier-to-protocol policy plus account-context alert-channel
//! resolution.

use serde::{Deserialize, Serialize};

use haven_alerts::AlertChannel;
use haven_risk::{RecommendedAction, RiskTier};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Read-only reference data describing what a tier triggers.
pub struct InterventionProtocol {
    pub actions: Vec<RecommendedAction>,
    pub escalate: bool,
    pub notify_counselors: bool,
    pub send_emergency_alert: bool,
    pub user_message: String,
}

impl InterventionProtocol {
    /// Resolves the fixed protocol for a tier. `None` maps to an inert
    /// protocol so callers never special-case the absence of a row.
    pub fn for_tier(tier: RiskTier) -> Self {
        match tier {
            RiskTier::None => Self {
                actions: Vec::new(),
                escalate: false,
                notify_counselors: false,
                send_emergency_alert: false,
                user_message: "Thanks for sharing how you are doing.".to_string(),
            },
            RiskTier::Low => Self {
                actions: vec![
                    RecommendedAction::AiSupport,
                    RecommendedAction::MoodExercises,
                ],
                escalate: false,
                notify_counselors: false,
                send_emergency_alert: false,
                user_message: "A short mood exercise might help right now.".to_string(),
            },
            RiskTier::Moderate => Self {
                actions: vec![
                    RecommendedAction::AiSupport,
                    RecommendedAction::PeerGroups,
                    RecommendedAction::SelfCare,
                ],
                escalate: false,
                notify_counselors: false,
                send_emergency_alert: false,
                user_message: "Consider connecting with a peer group or taking a self-care break."
                    .to_string(),
            },
            RiskTier::High => Self {
                actions: vec![
                    RecommendedAction::CounselorBooking,
                    RecommendedAction::CrisisResources,
                    RecommendedAction::PeerSupport,
                ],
                escalate: true,
                notify_counselors: true,
                send_emergency_alert: false,
                user_message: "We recommend booking time with a counselor — support is available."
                    .to_string(),
            },
            RiskTier::Critical => Self {
                actions: vec![
                    RecommendedAction::ImmediateCounselor,
                    RecommendedAction::EmergencyContacts,
                    RecommendedAction::CrisisHotline,
                ],
                escalate: true,
                notify_counselors: true,
                send_emergency_alert: true,
                user_message: "Please reach out for immediate support — you are not alone."
                    .to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `AccountType` values.
pub enum AccountType {
    Individual,
    Minor,
    Company,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Minor => "minor",
            Self::Company => "company",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `EmergencyPreference` values.
pub enum EmergencyPreference {
    #[default]
    Guardian,
    EmergencyServices,
}

impl EmergencyPreference {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Guardian => "guardian",
            Self::EmergencyServices => "emergency_services",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
/// Consent flags collected during onboarding.
pub struct AccountConsents {
    #[serde(default)]
    pub emergency_services: bool,
    #[serde(default)]
    pub hr_escalation: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Account context read from the user store before dispatch.
pub struct AccountRecord {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    pub account_type: AccountType,
    #[serde(default)]
    pub emergency_preference: EmergencyPreference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default)]
    pub consents: AccountConsents,
}

/// Resolves the outbound channels for an account. The three checks are
/// independent — any subset (including all three) can fire for one event.
pub fn resolve_alert_channels(account: &AccountRecord) -> Vec<AlertChannel> {
    let mut channels = Vec::new();

    if account.emergency_preference == EmergencyPreference::EmergencyServices
        && account.consents.emergency_services
    {
        channels.push(AlertChannel::EmergencyServices);
    }

    let guardian_phone = account
        .guardian_phone
        .as_deref()
        .map(str::trim)
        .filter(|phone| !phone.is_empty());
    if let Some(phone) = guardian_phone {
        if account.emergency_preference == EmergencyPreference::Guardian
            || account.account_type == AccountType::Minor
        {
            channels.push(AlertChannel::GuardianSms {
                phone: phone.to_string(),
            });
        }
    }

    if account.account_type == AccountType::Company && account.consents.hr_escalation {
        channels.push(AlertChannel::CompanyHr {
            company_name: account
                .company_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .unwrap_or("unnamed company")
                .to_string(),
        });
    }

    channels
}
