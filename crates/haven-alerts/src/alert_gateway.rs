//! Executes a resolved alert-channel set and records one outcome per
//! attempt.

use haven_core::current_unix_timestamp_ms;

use crate::alert_contract::{
    AlertChannel, AlertChannelKind, AlertDeliveryStatus, AlertDispatchJob, AlertOutcomeRecord,
    ALERT_REASON_NO_CHANNEL_CONFIGURED, ALERT_REASON_SMS_INVALID_RECIPIENT,
    ALERT_REASON_SMS_NOT_CONFIGURED, ALERT_REASON_SMS_PROVIDER_REJECTED,
    ALERT_REASON_SMS_TRANSPORT_FAILED,
};
use crate::alert_sms::{AlertSendError, GuardianSmsSender};

const EMERGENCY_SERVICES_DETAIL: &str =
    "recorded for emergency-services review; no live dispatch integration was contacted";

#[derive(Debug, Clone)]
/// Public struct `AlertGateway` used across Haven components.
pub struct AlertGateway {
    sms: GuardianSmsSender,
}

impl AlertGateway {
    pub fn new(sms: GuardianSmsSender) -> Self {
        Self { sms }
    }

    /// Dispatches every channel in the job, tolerating per-channel failure.
    /// Always returns at least one record: an empty channel set yields a
    /// synthetic `unconfigured`/`failed` outcome so the configuration gap is
    /// auditable rather than silent.
    pub async fn execute(&self, job: &AlertDispatchJob) -> Vec<AlertOutcomeRecord> {
        if job.channels.is_empty() {
            tracing::warn!(
                user_id = job.user_id.as_str(),
                tier = job.tier.as_str(),
                "emergency alert requested with no configured channel"
            );
            return vec![AlertOutcomeRecord {
                user_id: job.user_id.clone(),
                recipient_type: AlertChannelKind::Unconfigured,
                status: AlertDeliveryStatus::Failed,
                reason_code: Some(ALERT_REASON_NO_CHANNEL_CONFIGURED.to_string()),
                provider_ref: None,
                detail: Some("no alert channel is configured for this account".to_string()),
                timestamp_unix_ms: current_unix_timestamp_ms(),
            }];
        }

        let mut outcomes = Vec::with_capacity(job.channels.len());
        for channel in &job.channels {
            let outcome = match channel {
                AlertChannel::GuardianSms { phone } => self.dispatch_guardian_sms(job, phone).await,
                AlertChannel::EmergencyServices => logged_outcome(
                    job,
                    AlertChannelKind::EmergencyServices,
                    EMERGENCY_SERVICES_DETAIL.to_string(),
                ),
                AlertChannel::CompanyHr { company_name } => logged_outcome(
                    job,
                    AlertChannelKind::CompanyHr,
                    format!("routed to {company_name} HR wellness contact log"),
                ),
            };
            tracing::info!(
                user_id = job.user_id.as_str(),
                recipient_type = outcome.recipient_type.as_str(),
                status = outcome.status.as_str(),
                reason_code = outcome.reason_code.as_deref().unwrap_or("none"),
                "alert channel dispatched"
            );
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn dispatch_guardian_sms(
        &self,
        job: &AlertDispatchJob,
        phone: &str,
    ) -> AlertOutcomeRecord {
        match self.sms.send(phone, &job.message).await {
            Ok(receipt) => AlertOutcomeRecord {
                user_id: job.user_id.clone(),
                recipient_type: AlertChannelKind::GuardianSms,
                status: receipt.status,
                reason_code: None,
                provider_ref: receipt.provider_ref,
                detail: None,
                timestamp_unix_ms: current_unix_timestamp_ms(),
            },
            Err(error) => {
                tracing::warn!(
                    user_id = job.user_id.as_str(),
                    error = %error,
                    "guardian sms dispatch failed"
                );
                AlertOutcomeRecord {
                    user_id: job.user_id.clone(),
                    recipient_type: AlertChannelKind::GuardianSms,
                    status: AlertDeliveryStatus::Failed,
                    reason_code: Some(sms_failure_reason_code(&error).to_string()),
                    provider_ref: None,
                    detail: Some(error.to_string()),
                    timestamp_unix_ms: current_unix_timestamp_ms(),
                }
            }
        }
    }
}

fn logged_outcome(
    job: &AlertDispatchJob,
    recipient_type: AlertChannelKind,
    detail: String,
) -> AlertOutcomeRecord {
    AlertOutcomeRecord {
        user_id: job.user_id.clone(),
        recipient_type,
        status: AlertDeliveryStatus::Logged,
        reason_code: None,
        provider_ref: None,
        detail: Some(detail),
        timestamp_unix_ms: current_unix_timestamp_ms(),
    }
}

fn sms_failure_reason_code(error: &AlertSendError) -> &'static str {
    match error {
        AlertSendError::NotConfigured { .. } => ALERT_REASON_SMS_NOT_CONFIGURED,
        AlertSendError::InvalidRecipient { .. } => ALERT_REASON_SMS_INVALID_RECIPIENT,
        AlertSendError::Provider { .. } => ALERT_REASON_SMS_PROVIDER_REJECTED,
        AlertSendError::Http(_) => ALERT_REASON_SMS_TRANSPORT_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use haven_risk::RiskTier;

    use super::AlertGateway;
    use crate::alert_contract::{
        AlertChannel, AlertChannelKind, AlertDeliveryStatus, AlertDispatchJob,
        ALERT_REASON_NO_CHANNEL_CONFIGURED, ALERT_REASON_SMS_NOT_CONFIGURED,
    };
    use crate::alert_sms::{GuardianSmsConfig, GuardianSmsSender, SmsDeliveryMode};

    fn job(channels: Vec<AlertChannel>) -> AlertDispatchJob {
        AlertDispatchJob {
            user_id: "user-1".to_string(),
            tier: RiskTier::Critical,
            channels,
            message: "please check in".to_string(),
        }
    }

    fn dry_run_gateway() -> AlertGateway {
        AlertGateway::new(GuardianSmsSender::new(GuardianSmsConfig::default()).expect("sender"))
    }

    #[tokio::test]
    async fn regression_empty_channel_set_still_produces_a_record() {
        let outcomes = dry_run_gateway().execute(&job(Vec::new())).await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].recipient_type, AlertChannelKind::Unconfigured);
        assert_eq!(outcomes[0].status, AlertDeliveryStatus::Failed);
        assert_eq!(
            outcomes[0].reason_code.as_deref(),
            Some(ALERT_REASON_NO_CHANNEL_CONFIGURED)
        );
    }

    #[tokio::test]
    async fn functional_logged_channels_always_succeed_without_claiming_contact() {
        let outcomes = dry_run_gateway()
            .execute(&job(vec![
                AlertChannel::EmergencyServices,
                AlertChannel::CompanyHr {
                    company_name: "Acme".to_string(),
                },
            ]))
            .await;
        assert_eq!(outcomes.len(), 2);
        for outcome in &outcomes {
            assert_eq!(outcome.status, AlertDeliveryStatus::Logged);
        }
        assert!(outcomes[0]
            .detail
            .as_deref()
            .expect("detail")
            .contains("no live dispatch"));
        assert!(outcomes[1].detail.as_deref().expect("detail").contains("Acme"));
    }

    #[tokio::test]
    async fn functional_sms_failure_does_not_abort_remaining_channels() {
        let gateway = AlertGateway::new(
            GuardianSmsSender::new(GuardianSmsConfig {
                mode: SmsDeliveryMode::Provider,
                ..GuardianSmsConfig::default()
            })
            .expect("sender"),
        );
        let outcomes = gateway
            .execute(&job(vec![
                AlertChannel::GuardianSms {
                    phone: "+15551230000".to_string(),
                },
                AlertChannel::EmergencyServices,
            ]))
            .await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].status, AlertDeliveryStatus::Failed);
        assert_eq!(
            outcomes[0].reason_code.as_deref(),
            Some(ALERT_REASON_SMS_NOT_CONFIGURED)
        );
        assert_eq!(outcomes[1].status, AlertDeliveryStatus::Logged);
    }

    #[tokio::test]
    async fn unit_dry_run_guardian_sms_records_logged_outcome() {
        let outcomes = dry_run_gateway()
            .execute(&job(vec![AlertChannel::GuardianSms {
                phone: "+15551230000".to_string(),
            }]))
            .await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, AlertDeliveryStatus::Logged);
    }
}
