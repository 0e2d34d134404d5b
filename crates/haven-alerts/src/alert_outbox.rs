//! Fire-and-forget executor for alert dispatch.
//!
//! Guardian alerts are handed to a dedicated worker task through an unbounded
//! channel, so the triggering request returns without awaiting the send and
//! its cancellation cannot cancel an in-flight alert. Outcomes reach durable
//! storage through the [`AlertOutcomeSink`] seam from the worker side.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::alert_contract::{AlertDispatchJob, AlertOutcomeSink};
use crate::alert_gateway::AlertGateway;

#[derive(Debug)]
/// Public struct `AlertOutbox` used across Haven components.
pub struct AlertOutbox {
    sender: mpsc::UnboundedSender<AlertDispatchJob>,
    worker: JoinHandle<()>,
}

impl AlertOutbox {
    /// Spawns the worker task. Must be called from within a tokio runtime.
    pub fn spawn(gateway: AlertGateway, sink: Arc<dyn AlertOutcomeSink>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<AlertDispatchJob>();
        let worker = tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                let outcomes = gateway.execute(&job).await;
                for outcome in &outcomes {
                    if let Err(error) = sink.record_alert_outcome(outcome) {
                        tracing::warn!(
                            user_id = outcome.user_id.as_str(),
                            recipient_type = outcome.recipient_type.as_str(),
                            error = %error,
                            "failed to record alert outcome"
                        );
                    }
                }
            }
        });
        Self { sender, worker }
    }

    /// Hands one job to the worker without waiting for delivery.
    pub fn enqueue(&self, job: AlertDispatchJob) -> Result<()> {
        self.sender
            .send(job)
            .map_err(|_| anyhow!("alert outbox worker is no longer running"))
    }

    /// Closes the queue and waits for the worker to finish every queued job.
    /// Callers that exit immediately after dispatch (the CLI, tests) use this
    /// to guarantee queued alerts are not dropped on shutdown.
    pub async fn drain(self) -> Result<()> {
        drop(self.sender);
        self.worker
            .await
            .context("alert outbox worker terminated abnormally")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use haven_risk::RiskTier;

    use super::AlertOutbox;
    use crate::alert_contract::{
        AlertChannel, AlertChannelKind, AlertDeliveryStatus, AlertDispatchJob, AlertOutcomeRecord,
        AlertOutcomeSink,
    };
    use crate::alert_gateway::AlertGateway;
    use crate::alert_sms::{GuardianSmsConfig, GuardianSmsSender};

    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<AlertOutcomeRecord>>,
    }

    impl AlertOutcomeSink for RecordingSink {
        fn record_alert_outcome(&self, record: &AlertOutcomeRecord) -> anyhow::Result<()> {
            self.records.lock().expect("lock").push(record.clone());
            Ok(())
        }
    }

    fn dry_run_gateway() -> AlertGateway {
        AlertGateway::new(GuardianSmsSender::new(GuardianSmsConfig::default()).expect("sender"))
    }

    #[tokio::test]
    async fn functional_enqueued_jobs_record_outcomes_after_drain() {
        let sink = Arc::new(RecordingSink::default());
        let outbox = AlertOutbox::spawn(dry_run_gateway(), sink.clone());

        outbox
            .enqueue(AlertDispatchJob {
                user_id: "user-9".to_string(),
                tier: RiskTier::Critical,
                channels: vec![
                    AlertChannel::GuardianSms {
                        phone: "+15551230000".to_string(),
                    },
                    AlertChannel::EmergencyServices,
                ],
                message: "please check in".to_string(),
            })
            .expect("enqueue");
        outbox.drain().await.expect("drain");

        let records = sink.records.lock().expect("lock");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].recipient_type, AlertChannelKind::GuardianSms);
        assert_eq!(records[1].status, AlertDeliveryStatus::Logged);
    }

    #[tokio::test]
    async fn unit_enqueue_after_drain_reports_stopped_worker() {
        let sink = Arc::new(RecordingSink::default());
        let outbox = AlertOutbox::spawn(dry_run_gateway(), sink);
        let sender = outbox.sender.clone();
        outbox.drain().await.expect("drain");
        let error = sender
            .send(AlertDispatchJob {
                user_id: "user-1".to_string(),
                tier: RiskTier::High,
                channels: Vec::new(),
                message: String::new(),
            })
            .expect_err("worker stopped");
        let _ = error;
    }
}
