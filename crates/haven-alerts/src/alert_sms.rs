//! Guardian SMS delivery through a Twilio-style messaging provider.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use haven_risk::{CRISIS_HOTLINE_CALL, CRISIS_TEXT_LINE};

use crate::alert_contract::AlertDeliveryStatus;

pub const DEFAULT_SMS_API_BASE: &str = "https://api.twilio.com";
const SMS_DETAIL_CAP: usize = 300;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `SmsDeliveryMode` values.
pub enum SmsDeliveryMode {
    #[default]
    DryRun,
    Provider,
}

impl SmsDeliveryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DryRun => "dry_run",
            Self::Provider => "provider",
        }
    }
}

#[derive(Debug, Clone)]
/// Public struct `GuardianSmsConfig` used across Haven components.
pub struct GuardianSmsConfig {
    pub mode: SmsDeliveryMode,
    pub api_base: String,
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub sender_number: Option<String>,
    pub http_timeout_ms: u64,
}

impl Default for GuardianSmsConfig {
    fn default() -> Self {
        Self {
            mode: SmsDeliveryMode::DryRun,
            api_base: DEFAULT_SMS_API_BASE.to_string(),
            account_sid: None,
            auth_token: None,
            sender_number: None,
            http_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Error)]
/// Enumerates supported `AlertSendError` values.
pub enum AlertSendError {
    #[error("SMS service not configured: missing {missing}")]
    NotConfigured { missing: &'static str },
    #[error("guardian phone '{phone}' is not an E.164-like number")]
    InvalidRecipient { phone: String },
    #[error("sms provider returned status {status}: {detail}")]
    Provider { status: u16, detail: String },
    #[error("sms transport error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq)]
/// Public struct `SmsDeliveryReceipt` used across Haven components.
pub struct SmsDeliveryReceipt {
    pub status: AlertDeliveryStatus,
    pub provider_ref: Option<String>,
    pub endpoint: String,
}

#[derive(Debug, Clone)]
/// Public struct `GuardianSmsSender` used across Haven components.
pub struct GuardianSmsSender {
    client: reqwest::Client,
    config: GuardianSmsConfig,
}

impl GuardianSmsSender {
    pub fn new(config: GuardianSmsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms.max(1)))
            .build()
            .context("failed to build guardian sms http client")?;
        Ok(Self { client, config })
    }

    pub fn mode(&self) -> SmsDeliveryMode {
        self.config.mode
    }

    fn credentials(&self) -> Result<(&str, &str, &str), AlertSendError> {
        let account_sid = required_credential(self.config.account_sid.as_deref(), "account sid")?;
        let auth_token = required_credential(self.config.auth_token.as_deref(), "auth token")?;
        let sender_number =
            required_credential(self.config.sender_number.as_deref(), "sender number")?;
        Ok((account_sid, auth_token, sender_number))
    }

    fn messages_endpoint(&self, account_sid: &str) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{base}/2010-04-01/Accounts/{account_sid}/Messages.json")
    }

    /// Sends one SMS to `to`. Dry-run mode skips the provider entirely and
    /// reports a `logged` receipt; provider mode requires full credentials
    /// and surfaces their absence as a hard failure.
    pub async fn send(&self, to: &str, body: &str) -> Result<SmsDeliveryReceipt, AlertSendError> {
        if !is_e164_like(to) {
            return Err(AlertSendError::InvalidRecipient {
                phone: to.to_string(),
            });
        }

        if self.config.mode == SmsDeliveryMode::DryRun {
            return Ok(SmsDeliveryReceipt {
                status: AlertDeliveryStatus::Logged,
                provider_ref: None,
                endpoint: "dry-run".to_string(),
            });
        }

        let (account_sid, auth_token, sender_number) = self.credentials()?;
        let endpoint = self.messages_endpoint(account_sid);
        let response = self
            .client
            .post(&endpoint)
            .basic_auth(account_sid, Some(auth_token))
            .form(&[("To", to), ("From", sender_number), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(AlertSendError::Provider {
                status: status.as_u16(),
                detail: truncate_detail(&raw),
            });
        }

        let provider_ref = serde_json::from_str::<Value>(&raw)
            .ok()
            .and_then(|parsed| {
                parsed
                    .get("sid")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });
        Ok(SmsDeliveryReceipt {
            status: AlertDeliveryStatus::Sent,
            provider_ref,
            endpoint,
        })
    }
}

/// Fixed safety message sent to guardians. The hotline numbers are part of
/// the template and never vary per user.
pub fn guardian_alert_message(display_name: &str) -> String {
    let name = display_name.trim();
    let who = if name.is_empty() { "Someone you support" } else { name };
    format!(
        "{who} may be going through a mental health crisis and listed you as an \
         emergency contact. Please reach out to them as soon as you can. If they are \
         in immediate danger, call {CRISIS_HOTLINE_CALL} (Suicide & Crisis Lifeline) \
         or have them text HOME to {CRISIS_TEXT_LINE}."
    )
}

fn required_credential<'a>(
    value: Option<&'a str>,
    missing: &'static str,
) -> Result<&'a str, AlertSendError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(AlertSendError::NotConfigured { missing })
}

fn is_e164_like(value: &str) -> bool {
    if !value.starts_with('+') {
        return false;
    }
    let digits = &value[1..];
    !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit())
}

fn truncate_detail(raw: &str) -> String {
    if raw.chars().count() <= SMS_DETAIL_CAP {
        return raw.to_string();
    }
    let truncated: String = raw.chars().take(SMS_DETAIL_CAP).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::{
        guardian_alert_message, is_e164_like, GuardianSmsConfig, GuardianSmsSender,
        SmsDeliveryMode,
    };
    use crate::alert_contract::AlertDeliveryStatus;
    use crate::alert_sms::AlertSendError;

    fn provider_config(base: &str) -> GuardianSmsConfig {
        GuardianSmsConfig {
            mode: SmsDeliveryMode::Provider,
            api_base: base.to_string(),
            account_sid: Some("AC123".to_string()),
            auth_token: Some("token".to_string()),
            sender_number: Some("+15550001111".to_string()),
            ..GuardianSmsConfig::default()
        }
    }

    #[test]
    fn unit_is_e164_like_requires_plus_and_digits() {
        assert!(is_e164_like("+15551230000"));
        assert!(!is_e164_like("15551230000"));
        assert!(!is_e164_like("+1555-123"));
        assert!(!is_e164_like("+"));
    }

    #[test]
    fn unit_guardian_message_embeds_both_hotlines() {
        let message = guardian_alert_message("Jordan");
        assert!(message.contains("Jordan"));
        assert!(message.contains("988"));
        assert!(message.contains("741741"));
    }

    #[tokio::test]
    async fn regression_provider_mode_without_credentials_is_a_hard_failure() {
        let sender = GuardianSmsSender::new(GuardianSmsConfig {
            mode: SmsDeliveryMode::Provider,
            ..GuardianSmsConfig::default()
        })
        .expect("sender");
        let error = sender
            .send("+15551230000", "hello")
            .await
            .expect_err("missing credentials");
        assert!(error.to_string().contains("SMS service not configured"));
    }

    #[tokio::test]
    async fn unit_dry_run_reports_logged_without_touching_provider() {
        let sender = GuardianSmsSender::new(GuardianSmsConfig::default()).expect("sender");
        let receipt = sender.send("+15551230000", "hello").await.expect("receipt");
        assert_eq!(receipt.status, AlertDeliveryStatus::Logged);
        assert!(receipt.provider_ref.is_none());
    }

    #[tokio::test]
    async fn functional_provider_send_posts_form_and_reads_sid() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/2010-04-01/Accounts/AC123/Messages.json")
                .body_includes("To=%2B15551230000");
            then.status(201).body(r#"{"sid": "SM999"}"#);
        });

        let sender = GuardianSmsSender::new(provider_config(&server.base_url())).expect("sender");
        let receipt = sender
            .send("+15551230000", "please check in")
            .await
            .expect("receipt");
        mock.assert();
        assert_eq!(receipt.status, AlertDeliveryStatus::Sent);
        assert_eq!(receipt.provider_ref.as_deref(), Some("SM999"));
    }

    #[tokio::test]
    async fn functional_provider_rejection_surfaces_status_and_detail() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path_includes("/Messages.json");
            then.status(400).body("invalid destination");
        });

        let sender = GuardianSmsSender::new(provider_config(&server.base_url())).expect("sender");
        let error = sender
            .send("+15551230000", "please check in")
            .await
            .expect_err("rejected");
        assert!(matches!(error, AlertSendError::Provider { status: 400, .. }));
    }

    #[tokio::test]
    async fn unit_invalid_recipient_fails_before_any_send() {
        let sender = GuardianSmsSender::new(GuardianSmsConfig::default()).expect("sender");
        let error = sender
            .send("555-1234", "hello")
            .await
            .expect_err("invalid recipient");
        assert!(matches!(error, AlertSendError::InvalidRecipient { .. }));
    }
}
