//! Append-only JSONL audit stores for assessments, escalation events, alert
//! outcomes, and counselor notifications.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use haven_alerts::{AlertOutcomeRecord, AlertOutcomeSink};
use haven_core::{append_jsonl_record, read_jsonl_records};
use haven_risk::{CrisisAssessment, RiskTier};

const ASSESSMENTS_LOG_FILE: &str = "assessments.jsonl";
const ESCALATION_EVENTS_LOG_FILE: &str = "escalation-events.jsonl";
const ALERT_OUTCOMES_LOG_FILE: &str = "alert-outcomes.jsonl";
const COUNSELOR_NOTIFICATIONS_LOG_FILE: &str = "counselor-notifications.jsonl";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One persisted assessment row keyed by user and creation timestamp.
pub struct AssessmentRecord {
    pub user_id: String,
    #[serde(flatten)]
    pub assessment: CrisisAssessment,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Append-only audit row marking that a tier's protocol was triggered.
/// Written ahead of every side effect, never updated or deleted here.
pub struct EscalationEvent {
    pub user_id: String,
    pub tier: RiskTier,
    pub score: f64,
    pub factors: Vec<String>,
    pub intervention_triggered: bool,
    pub timestamp_unix_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Record of one on-duty counselor notification.
pub struct CounselorNotificationRecord {
    pub user_id: String,
    pub tier: RiskTier,
    pub score: f64,
    pub summary: String,
    pub timestamp_unix_ms: u64,
}

#[derive(Debug, Clone)]
/// Public struct `EscalationStore` used across Haven components.
pub struct EscalationStore {
    state_dir: PathBuf,
}

impl EscalationStore {
    pub fn open(state_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(state_dir)
            .with_context(|| format!("failed to create {}", state_dir.display()))?;
        Ok(Self {
            state_dir: state_dir.to_path_buf(),
        })
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    fn assessments_path(&self) -> PathBuf {
        self.state_dir.join(ASSESSMENTS_LOG_FILE)
    }

    fn escalation_events_path(&self) -> PathBuf {
        self.state_dir.join(ESCALATION_EVENTS_LOG_FILE)
    }

    fn alert_outcomes_path(&self) -> PathBuf {
        self.state_dir.join(ALERT_OUTCOMES_LOG_FILE)
    }

    fn counselor_notifications_path(&self) -> PathBuf {
        self.state_dir.join(COUNSELOR_NOTIFICATIONS_LOG_FILE)
    }

    pub fn append_assessment(&self, record: &AssessmentRecord) -> Result<()> {
        append_jsonl_record(&self.assessments_path(), record)
            .context("failed to append assessment audit row")
    }

    pub fn append_escalation_event(&self, event: &EscalationEvent) -> Result<()> {
        append_jsonl_record(&self.escalation_events_path(), event)
            .context("failed to append escalation event")
    }

    pub fn append_counselor_notification(
        &self,
        record: &CounselorNotificationRecord,
    ) -> Result<()> {
        append_jsonl_record(&self.counselor_notifications_path(), record)
            .context("failed to append counselor notification")
    }

    pub fn load_assessments(&self) -> Result<Vec<AssessmentRecord>> {
        read_jsonl_records(&self.assessments_path())
    }

    pub fn load_escalation_events(&self) -> Result<Vec<EscalationEvent>> {
        read_jsonl_records(&self.escalation_events_path())
    }

    pub fn load_alert_outcomes(&self) -> Result<Vec<AlertOutcomeRecord>> {
        read_jsonl_records(&self.alert_outcomes_path())
    }

    pub fn load_counselor_notifications(&self) -> Result<Vec<CounselorNotificationRecord>> {
        read_jsonl_records(&self.counselor_notifications_path())
    }
}

impl AlertOutcomeSink for EscalationStore {
    fn record_alert_outcome(&self, record: &AlertOutcomeRecord) -> Result<()> {
        append_jsonl_record(&self.alert_outcomes_path(), record)
            .context("failed to append alert outcome")
    }
}
