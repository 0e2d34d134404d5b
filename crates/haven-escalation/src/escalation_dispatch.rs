//! Best-effort escalation dispatch state machine.
//!
//! Per assessment the dispatcher walks `ASSESSED → LOGGED →
//! COUNSELORS_NOTIFIED → ALERT_DISPATCHED → DONE`. The escalation event is
//! written ahead of every side effect so a crash mid-dispatch still leaves an
//! auditable trail of intent, and each later transition is independently
//! fallible: a failed counselor notification never blocks alert dispatch.
//! Only a failed audit write surfaces as an error to the caller.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use haven_alerts::{
    guardian_alert_message, AlertChannel, AlertChannelKind, AlertDispatchJob, AlertOutbox,
    ALERT_REASON_NO_CHANNEL_CONFIGURED,
};
use haven_core::current_unix_timestamp_ms;
use haven_risk::{assessment_factors, CrisisAssessment, RiskTier};

use crate::escalation_protocol::{resolve_alert_channels, AccountRecord, InterventionProtocol};
use crate::escalation_store::{
    AssessmentRecord, CounselorNotificationRecord, EscalationEvent, EscalationStore,
};

pub const ESCALATION_REASON_COUNSELOR_NOTIFY_FAILED: &str = "counselor_notify_failed";
pub const ESCALATION_REASON_OUTBOX_UNAVAILABLE: &str = "alert_outbox_unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `EscalationDispatchState` values.
pub enum EscalationDispatchState {
    Assessed,
    Logged,
    CounselorsNotified,
    AlertDispatched,
    Done,
}

impl EscalationDispatchState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assessed => "assessed",
            Self::Logged => "logged",
            Self::CounselorsNotified => "counselors_notified",
            Self::AlertDispatched => "alert_dispatched",
            Self::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `AlertDispatchDisposition` values.
pub enum AlertDispatchDisposition {
    Queued,
    NotRequired,
    NoChannelConfigured,
    OutboxUnavailable,
}

impl AlertDispatchDisposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::NotRequired => "not_required",
            Self::NoChannelConfigured => "no_channel_configured",
            Self::OutboxUnavailable => "outbox_unavailable",
        }
    }
}

#[derive(Debug, Clone)]
/// Payload handed to the counselor notification seam.
pub struct CounselorNotice {
    pub user_id: String,
    pub tier: RiskTier,
    pub score: f64,
    pub factors: Vec<String>,
}

/// Seam for on-duty counselor notification delivery.
pub trait CounselorNotifier: Send + Sync {
    fn notify_on_duty(&self, notice: &CounselorNotice) -> Result<()>;
}

/// Default notifier: records the notification in the audit store, where the
/// counselor dashboard picks it up.
pub struct StoreCounselorNotifier {
    store: Arc<EscalationStore>,
}

impl StoreCounselorNotifier {
    pub fn new(store: Arc<EscalationStore>) -> Self {
        Self { store }
    }
}

impl CounselorNotifier for StoreCounselorNotifier {
    fn notify_on_duty(&self, notice: &CounselorNotice) -> Result<()> {
        self.store
            .append_counselor_notification(&CounselorNotificationRecord {
                user_id: notice.user_id.clone(),
                tier: notice.tier,
                score: notice.score,
                summary: if notice.factors.is_empty() {
                    "no contributing factors recorded".to_string()
                } else {
                    notice.factors.join("; ")
                },
                timestamp_unix_ms: current_unix_timestamp_ms(),
            })
    }
}

#[derive(Debug, Clone, Serialize)]
/// Aggregate outcome of one dispatch pass, suitable for operator rendering.
pub struct EscalationDispatchReport {
    pub user_id: String,
    pub tier: RiskTier,
    pub score: f64,
    pub escalation_logged: bool,
    pub counselors_notified: bool,
    pub counselor_reason_code: Option<String>,
    pub alert_disposition: AlertDispatchDisposition,
    pub alert_reason_code: Option<String>,
    pub alert_channels: Vec<AlertChannelKind>,
    pub state_history: Vec<String>,
    pub updated_unix_ms: u64,
}

/// Public struct `EscalationDispatcher` used across Haven components.
pub struct EscalationDispatcher {
    store: Arc<EscalationStore>,
    notifier: Arc<dyn CounselorNotifier>,
}

impl EscalationDispatcher {
    pub fn new(store: Arc<EscalationStore>, notifier: Arc<dyn CounselorNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Persists the assessment, then (for escalating tiers) logs the
    /// escalation event and runs the best-effort side effects. The guardian
    /// send itself is handed to `outbox` and not awaited here.
    pub fn dispatch(
        &self,
        assessment: &CrisisAssessment,
        account: &AccountRecord,
        outbox: &AlertOutbox,
    ) -> Result<EscalationDispatchReport> {
        let protocol = InterventionProtocol::for_tier(assessment.tier);
        let mut states = vec![EscalationDispatchState::Assessed];

        self.store.append_assessment(&AssessmentRecord {
            user_id: account.user_id.clone(),
            assessment: assessment.clone(),
        })?;

        let factors = assessment_factors(assessment);
        let resolved = resolve_alert_channels(account);
        // High-tier escalations reach out through the guardian channel only;
        // the full channel set is reserved for protocols that demand an
        // emergency alert.
        let dispatch_channels: Vec<AlertChannel> = if protocol.send_emergency_alert {
            resolved
        } else {
            resolved
                .into_iter()
                .filter(|channel| matches!(channel, AlertChannel::GuardianSms { .. }))
                .collect()
        };

        if !protocol.escalate {
            states.push(EscalationDispatchState::Done);
            return Ok(self.build_report(
                assessment,
                account,
                false,
                false,
                None,
                AlertDispatchDisposition::NotRequired,
                None,
                Vec::new(),
                states,
            ));
        }

        let intervention_triggered =
            protocol.send_emergency_alert || !dispatch_channels.is_empty();
        self.store.append_escalation_event(&EscalationEvent {
            user_id: account.user_id.clone(),
            tier: assessment.tier,
            score: assessment.score,
            factors: factors.clone(),
            intervention_triggered,
            timestamp_unix_ms: current_unix_timestamp_ms(),
        })?;
        states.push(EscalationDispatchState::Logged);
        tracing::info!(
            user_id = account.user_id.as_str(),
            tier = assessment.tier.as_str(),
            score = assessment.score,
            "escalation event logged"
        );

        let mut counselors_notified = false;
        let mut counselor_reason_code = None;
        if protocol.notify_counselors {
            let notice = CounselorNotice {
                user_id: account.user_id.clone(),
                tier: assessment.tier,
                score: assessment.score,
                factors,
            };
            match self.notifier.notify_on_duty(&notice) {
                Ok(()) => {
                    counselors_notified = true;
                    states.push(EscalationDispatchState::CounselorsNotified);
                }
                Err(error) => {
                    tracing::warn!(
                        user_id = account.user_id.as_str(),
                        error = %error,
                        "counselor notification failed"
                    );
                    counselor_reason_code =
                        Some(ESCALATION_REASON_COUNSELOR_NOTIFY_FAILED.to_string());
                }
            }
        }

        let alert_channel_kinds = dispatch_channels
            .iter()
            .map(AlertChannel::kind)
            .collect::<Vec<_>>();
        let (alert_disposition, alert_reason_code) = if protocol.send_emergency_alert
            || !dispatch_channels.is_empty()
        {
            let missing_channels =
                protocol.send_emergency_alert && dispatch_channels.is_empty();
            let job = AlertDispatchJob {
                user_id: account.user_id.clone(),
                tier: assessment.tier,
                channels: dispatch_channels,
                message: guardian_alert_message(&account.display_name),
            };
            match outbox.enqueue(job) {
                Ok(()) => {
                    states.push(EscalationDispatchState::AlertDispatched);
                    if missing_channels {
                        // The gateway records the configuration gap as a
                        // failed outcome; the disposition surfaces it as a
                        // domain error rather than a crisis failure.
                        (
                            AlertDispatchDisposition::NoChannelConfigured,
                            Some(ALERT_REASON_NO_CHANNEL_CONFIGURED.to_string()),
                        )
                    } else {
                        (AlertDispatchDisposition::Queued, None)
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        user_id = account.user_id.as_str(),
                        error = %error,
                        "failed to hand alert job to outbox"
                    );
                    (
                        AlertDispatchDisposition::OutboxUnavailable,
                        Some(ESCALATION_REASON_OUTBOX_UNAVAILABLE.to_string()),
                    )
                }
            }
        } else {
            (AlertDispatchDisposition::NotRequired, None)
        };

        states.push(EscalationDispatchState::Done);
        Ok(self.build_report(
            assessment,
            account,
            true,
            counselors_notified,
            counselor_reason_code,
            alert_disposition,
            alert_reason_code,
            alert_channel_kinds,
            states,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn build_report(
        &self,
        assessment: &CrisisAssessment,
        account: &AccountRecord,
        escalation_logged: bool,
        counselors_notified: bool,
        counselor_reason_code: Option<String>,
        alert_disposition: AlertDispatchDisposition,
        alert_reason_code: Option<String>,
        alert_channels: Vec<AlertChannelKind>,
        states: Vec<EscalationDispatchState>,
    ) -> EscalationDispatchReport {
        EscalationDispatchReport {
            user_id: account.user_id.clone(),
            tier: assessment.tier,
            score: assessment.score,
            escalation_logged,
            counselors_notified,
            counselor_reason_code,
            alert_disposition,
            alert_reason_code,
            alert_channels,
            state_history: states
                .iter()
                .map(|state| state.as_str().to_string())
                .collect(),
            updated_unix_ms: current_unix_timestamp_ms(),
        }
    }
}

/// Renders the stable one-line dispatch summary used in operator output.
pub fn render_escalation_dispatch_report(report: &EscalationDispatchReport) -> String {
    format!(
        "escalation dispatch: user_id={} tier={} score={} escalation_logged={} \
         counselors_notified={} counselor_reason_code={} alert_disposition={} \
         alert_reason_code={} alert_channels={} states={}",
        report.user_id,
        report.tier.as_str(),
        report.score,
        report.escalation_logged,
        report.counselors_notified,
        report.counselor_reason_code.as_deref().unwrap_or("none"),
        report.alert_disposition.as_str(),
        report.alert_reason_code.as_deref().unwrap_or("none"),
        if report.alert_channels.is_empty() {
            "none".to_string()
        } else {
            report
                .alert_channels
                .iter()
                .map(|kind| kind.as_str())
                .collect::<Vec<_>>()
                .join(",")
        },
        report.state_history.join(">"),
    )
}
