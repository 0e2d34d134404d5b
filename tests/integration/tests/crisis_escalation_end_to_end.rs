//! End-to-end scenarios across the full engine: extract → aggregate →
//! resolve → dispatch → gateway.

use std::sync::Arc;

use httpmock::prelude::*;
use tempfile::tempdir;

use haven_alerts::{
    AlertChannelKind, AlertDeliveryStatus, AlertGateway, AlertOutbox, GuardianSmsConfig,
    GuardianSmsSender, SmsDeliveryMode,
};
use haven_escalation::{
    AccountConsents, AccountRecord, AccountType, EmergencyPreference, EscalationDispatcher,
    EscalationStore, InterventionProtocol, StoreCounselorNotifier,
};
use haven_risk::{
    assess_crisis_risk, AiCrisisScore, KeywordMatcher, RiskAssessmentInput, RiskTier,
};

fn guardian_account() -> AccountRecord {
    AccountRecord {
        user_id: "user-77".to_string(),
        display_name: "Riley".to_string(),
        account_type: AccountType::Individual,
        emergency_preference: EmergencyPreference::Guardian,
        guardian_phone: Some("+15551230000".to_string()),
        company_name: None,
        consents: AccountConsents::default(),
    }
}

fn input<'a>(text: &'a str, mood: u8, ai: Option<&'a AiCrisisScore>) -> RiskAssessmentInput<'a> {
    RiskAssessmentInput {
        text,
        mood,
        ai,
        voice: None,
        history: &[],
        now_unix_ms: 1_700_000_000_000,
    }
}

fn engine(store: &Arc<EscalationStore>, sms_config: GuardianSmsConfig) -> (EscalationDispatcher, AlertOutbox) {
    let gateway = AlertGateway::new(GuardianSmsSender::new(sms_config).expect("sender"));
    let outbox = AlertOutbox::spawn(gateway, store.clone());
    let dispatcher = EscalationDispatcher::new(
        store.clone(),
        Arc::new(StoreCounselorNotifier::new(store.clone())),
    );
    (dispatcher, outbox)
}

#[tokio::test]
async fn critical_message_escalates_with_alert_and_counselor_notification() {
    let temp = tempdir().expect("tempdir");
    let store = Arc::new(EscalationStore::open(temp.path()).expect("store"));
    let (dispatcher, outbox) = engine(&store, GuardianSmsConfig::default());

    let matcher = KeywordMatcher::new().expect("matcher");
    let ai = AiCrisisScore {
        crisis_score: 8.0,
        sentiment: "crisis".to_string(),
    };
    // keyword(critical)=5, mood(1)=5, ai=round(8*0.7)=6, raw 16 clamps to 10.
    let assessment = assess_crisis_risk(&matcher, &input("I want to end it all", 1, Some(&ai)));
    assert_eq!(assessment.score, 10.0);
    assert_eq!(assessment.tier, RiskTier::Critical);

    let protocol = InterventionProtocol::for_tier(assessment.tier);
    assert!(protocol.send_emergency_alert);
    assert!(protocol.notify_counselors);

    dispatcher
        .dispatch(&assessment, &guardian_account(), &outbox)
        .expect("dispatch");
    outbox.drain().await.expect("drain");

    assert_eq!(store.load_escalation_events().expect("events").len(), 1);
    assert_eq!(
        store.load_counselor_notifications().expect("notices").len(),
        1
    );
    let outcomes = store.load_alert_outcomes().expect("outcomes");
    assert!(!outcomes.is_empty());
    assert!(outcomes.iter().all(|outcome| matches!(
        outcome.status,
        AlertDeliveryStatus::Sent | AlertDeliveryStatus::Failed | AlertDeliveryStatus::Logged
    )));
}

#[tokio::test]
async fn neutral_checkin_creates_no_escalation_event() {
    let temp = tempdir().expect("tempdir");
    let store = Arc::new(EscalationStore::open(temp.path()).expect("store"));
    let (dispatcher, outbox) = engine(&store, GuardianSmsConfig::default());

    let matcher = KeywordMatcher::new().expect("matcher");
    let assessment = assess_crisis_risk(&matcher, &input("had an okay day", 4, None));
    assert_eq!(assessment.score, 0.0);
    assert_eq!(assessment.tier, RiskTier::None);

    dispatcher
        .dispatch(&assessment, &guardian_account(), &outbox)
        .expect("dispatch");
    outbox.drain().await.expect("drain");

    assert_eq!(store.load_assessments().expect("assessments").len(), 1);
    assert!(store.load_escalation_events().expect("events").is_empty());
    assert!(store.load_alert_outcomes().expect("outcomes").is_empty());
}

#[tokio::test]
async fn high_tier_guardian_preference_sends_exactly_one_guardian_sms() {
    let temp = tempdir().expect("tempdir");
    let store = Arc::new(EscalationStore::open(temp.path()).expect("store"));

    let provider = MockServer::start();
    let sms_mock = provider.mock(|when, then| {
        when.method(POST)
            .path("/2010-04-01/Accounts/AC123/Messages.json");
        then.status(201).body(r#"{"sid": "SM100"}"#);
    });
    let (dispatcher, outbox) = engine(
        &store,
        GuardianSmsConfig {
            mode: SmsDeliveryMode::Provider,
            api_base: provider.base_url(),
            account_sid: Some("AC123".to_string()),
            auth_token: Some("token".to_string()),
            sender_number: Some("+15550001111".to_string()),
            ..GuardianSmsConfig::default()
        },
    );

    let matcher = KeywordMatcher::new().expect("matcher");
    // keyword: hopeless(3) + can't sleep(2), mood(2)=2, raw 7 stays HIGH.
    let assessment =
        assess_crisis_risk(&matcher, &input("I feel hopeless and I can't sleep", 2, None));
    assert_eq!(assessment.tier, RiskTier::High);

    dispatcher
        .dispatch(&assessment, &guardian_account(), &outbox)
        .expect("dispatch");
    outbox.drain().await.expect("drain");

    sms_mock.assert();
    let outcomes = store.load_alert_outcomes().expect("outcomes");
    let guardian_records = outcomes
        .iter()
        .filter(|outcome| outcome.recipient_type == AlertChannelKind::GuardianSms)
        .collect::<Vec<_>>();
    assert_eq!(guardian_records.len(), 1);
    assert!(matches!(
        guardian_records[0].status,
        AlertDeliveryStatus::Sent | AlertDeliveryStatus::Failed
    ));
    assert!(!outcomes
        .iter()
        .any(|outcome| outcome.recipient_type == AlertChannelKind::EmergencyServices));

    // High tier escalates but never invokes the emergency-alert protocol.
    let protocol = InterventionProtocol::for_tier(RiskTier::High);
    assert!(protocol.escalate && !protocol.send_emergency_alert);
    assert_eq!(store.load_escalation_events().expect("events").len(), 1);
}

#[tokio::test]
async fn rapid_repeated_crises_append_independent_audit_rows() {
    let temp = tempdir().expect("tempdir");
    let store = Arc::new(EscalationStore::open(temp.path()).expect("store"));
    let (dispatcher, outbox) = engine(&store, GuardianSmsConfig::default());

    let matcher = KeywordMatcher::new().expect("matcher");
    let assessment = assess_crisis_risk(&matcher, &input("I want to end it all", 1, None));
    for _ in 0..3 {
        dispatcher
            .dispatch(&assessment, &guardian_account(), &outbox)
            .expect("dispatch");
    }
    outbox.drain().await.expect("drain");

    // No dedup across repeated crises: three events, three alert outcomes.
    assert_eq!(store.load_escalation_events().expect("events").len(), 3);
    assert_eq!(store.load_alert_outcomes().expect("outcomes").len(), 3);
}
