//! The `assess` command: runs the full extract → aggregate → resolve →
//! dispatch pipeline for one user message.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use haven_ai::{CrisisSignalProvider, CrisisSignalRequest, GeminiClient, GeminiConfig};
use haven_alerts::{AlertGateway, AlertOutbox, GuardianSmsConfig, GuardianSmsSender, SmsDeliveryMode};
use haven_core::current_unix_timestamp_ms;
use haven_escalation::{
    AccountRecord, EscalationDispatchReport, EscalationDispatcher, EscalationStore,
    StoreCounselorNotifier,
};
use haven_risk::{
    assess_crisis_risk, AiCrisisScore, CheckinSnapshot, CrisisAssessment, KeywordMatcher,
    RiskAssessmentInput, VoiceMoodInput,
};

use crate::cli_args::{AssessArgs, CliAiMode, CliSmsMode};

#[derive(Debug, Clone, Serialize)]
/// Public struct `AssessCommandReport` used across Haven components.
pub struct AssessCommandReport {
    pub assessment: CrisisAssessment,
    pub dispatch: EscalationDispatchReport,
}

pub async fn execute_assess_command(args: &AssessArgs) -> Result<AssessCommandReport> {
    let account = load_account_record(&args.account_file)?;
    let history = load_history(args.history_file.as_deref())?;
    let voice = load_voice_input(args.voice_file.as_deref())?;
    let ai = evaluate_ai_signal(args).await;

    let matcher = KeywordMatcher::new()?;
    let assessment = assess_crisis_risk(
        &matcher,
        &RiskAssessmentInput {
            text: &args.text,
            mood: args.mood,
            ai: ai.as_ref(),
            voice: voice.as_ref(),
            history: &history,
            now_unix_ms: current_unix_timestamp_ms(),
        },
    );

    let store = Arc::new(EscalationStore::open(&args.state_dir)?);
    let gateway = AlertGateway::new(GuardianSmsSender::new(build_sms_config(args))?);
    let outbox = AlertOutbox::spawn(gateway, store.clone());
    let dispatcher = EscalationDispatcher::new(
        store.clone(),
        Arc::new(StoreCounselorNotifier::new(store.clone())),
    );

    let dispatch = dispatcher.dispatch(&assessment, &account, &outbox)?;
    // The triggering request never awaits individual sends, but the process
    // must not exit with queued alerts still in flight.
    outbox.drain().await?;

    Ok(AssessCommandReport {
        assessment,
        dispatch,
    })
}

fn load_account_record(path: &Path) -> Result<AccountRecord> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("account record not found at {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse account record {}", path.display()))
}

fn load_history(path: Option<&Path>) -> Result<Vec<CheckinSnapshot>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read check-in history {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse check-in history {}", path.display()))
}

fn load_voice_input(path: Option<&Path>) -> Result<Option<VoiceMoodInput>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read voice analysis {}", path.display()))?;
    let parsed = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse voice analysis {}", path.display()))?;
    Ok(Some(parsed))
}

/// Evaluates the AI crisis signal when enabled. Every failure path degrades
/// to `None`; the assessment itself must never fail because a provider did.
async fn evaluate_ai_signal(args: &AssessArgs) -> Option<AiCrisisScore> {
    if args.ai_mode == CliAiMode::Off {
        return None;
    }
    let client = match GeminiClient::new(GeminiConfig {
        api_key: args.gemini_api_key.clone().unwrap_or_default(),
        request_timeout_ms: args.ai_timeout_ms,
        ..GeminiConfig::default()
    }) {
        Ok(client) => client,
        Err(error) => {
            tracing::warn!(error = %error, "ai provider unavailable; continuing without it");
            return None;
        }
    };

    let request = CrisisSignalRequest {
        message_text: args.text.clone(),
        mood: args.mood,
        context: Vec::new(),
    };
    match client.evaluate(&request).await {
        Ok(estimate) => Some(AiCrisisScore {
            crisis_score: estimate.crisis_score,
            sentiment: estimate.sentiment.as_str().to_string(),
        }),
        Err(error) => {
            tracing::warn!(error = %error, "ai evaluation failed; continuing without it");
            None
        }
    }
}

fn build_sms_config(args: &AssessArgs) -> GuardianSmsConfig {
    GuardianSmsConfig {
        mode: match args.sms_mode {
            CliSmsMode::DryRun => SmsDeliveryMode::DryRun,
            CliSmsMode::Provider => SmsDeliveryMode::Provider,
        },
        account_sid: args.twilio_account_sid.clone(),
        auth_token: args.twilio_auth_token.clone(),
        sender_number: args.twilio_from_number.clone(),
        ..GuardianSmsConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::tempdir;

    use super::{execute_assess_command, load_account_record};
    use crate::cli_args::{AssessArgs, CliAiMode, CliSmsMode};

    fn args(temp: &tempfile::TempDir, text: &str, mood: u8) -> AssessArgs {
        let account_file = temp.path().join("account.json");
        std::fs::write(
            &account_file,
            r#"{
  "user_id": "user-1",
  "display_name": "Casey",
  "account_type": "individual",
  "emergency_preference": "guardian",
  "guardian_phone": "+15551230000"
}
"#,
        )
        .expect("write account");
        AssessArgs {
            text: text.to_string(),
            mood,
            account_file,
            state_dir: temp.path().join("state"),
            history_file: None,
            voice_file: None,
            ai_mode: CliAiMode::Off,
            gemini_api_key: None,
            ai_timeout_ms: 1_000,
            sms_mode: CliSmsMode::DryRun,
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_from_number: None,
            json: false,
        }
    }

    #[test]
    fn unit_load_account_record_reports_missing_file() {
        let error = load_account_record(&PathBuf::from("/definitely/not/here.json"))
            .expect_err("missing file");
        assert!(error.to_string().contains("account record not found"));
    }

    #[tokio::test]
    async fn functional_assess_command_runs_end_to_end_in_dry_run() {
        let temp = tempdir().expect("tempdir");
        let report = execute_assess_command(&args(&temp, "I want to end it all", 1))
            .await
            .expect("report");
        assert_eq!(report.assessment.score, 10.0);
        assert!(report.dispatch.escalation_logged);
    }
}
