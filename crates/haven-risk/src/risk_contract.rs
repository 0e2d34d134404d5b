use serde::{Deserialize, Serialize};

/// Upper bound of the aggregate crisis score; contributions past this clamp.
pub const RISK_SCORE_MAX: f64 = 10.0;

/// Fixed hotline surfaced in critical recommendations and guardian alerts.
pub const CRISIS_HOTLINE_CALL: &str = "988";
/// Fixed crisis text line surfaced alongside the call hotline.
pub const CRISIS_TEXT_LINE: &str = "741741";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `RiskSignalSource` values.
pub enum RiskSignalSource {
    Keyword,
    Mood,
    AiSentiment,
    Voice,
    History,
}

impl RiskSignalSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Mood => "mood",
            Self::AiSentiment => "ai_sentiment",
            Self::Voice => "voice",
            Self::History => "history",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One bounded numeric contribution from a single evidence source.
pub struct RiskSignal {
    pub source: RiskSignalSource,
    pub contribution: f64,
    pub evidence: Vec<String>,
}

impl RiskSignal {
    pub fn empty(source: RiskSignalSource) -> Self {
        Self {
            source,
            contribution: 0.0,
            evidence: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
/// Severity classification derived from the aggregate score. Ordering follows
/// severity so tiers compare with `>=`.
pub enum RiskTier {
    None,
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Returns true for the tiers whose protocol always records an
    /// escalation event.
    pub fn requires_escalation(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `VoiceMoodLabel` values.
pub enum VoiceMoodLabel {
    Sad,
    Anxious,
    Angry,
    Calm,
    Neutral,
    #[serde(other)]
    Unrecognized,
}

impl VoiceMoodLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sad => "sad",
            Self::Anxious => "anxious",
            Self::Angry => "angry",
            Self::Calm => "calm",
            Self::Neutral => "neutral",
            Self::Unrecognized => "unrecognized",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Voice-analysis output supplied by the transcription collaborator.
pub struct VoiceMoodInput {
    pub transcript: String,
    pub detected_mood: VoiceMoodLabel,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One prior mood check-in as read back from the check-in store.
pub struct CheckinSnapshot {
    pub mood: u8,
    pub timestamp_unix_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crisis_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Externally computed AI crisis estimate. The engine treats both fields as
/// opaque inputs; how the provider derives them is not its concern.
pub struct AiCrisisScore {
    pub crisis_score: f64,
    pub sentiment: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `RecommendedAction` values.
pub enum RecommendedAction {
    AiSupport,
    MoodExercises,
    PeerGroups,
    SelfCare,
    CounselorBooking,
    CrisisResources,
    PeerSupport,
    ImmediateCounselor,
    EmergencyContacts,
    CrisisHotline,
}

impl RecommendedAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AiSupport => "ai_support",
            Self::MoodExercises => "mood_exercises",
            Self::PeerGroups => "peer_groups",
            Self::SelfCare => "self_care",
            Self::CounselorBooking => "counselor_booking",
            Self::CrisisResources => "crisis_resources",
            Self::PeerSupport => "peer_support",
            Self::ImmediateCounselor => "immediate_counselor",
            Self::EmergencyContacts => "emergency_contacts",
            Self::CrisisHotline => "crisis_hotline",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `RecommendationUrgency` values.
pub enum RecommendationUrgency {
    Routine,
    Elevated,
    High,
    Immediate,
}

impl RecommendationUrgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Routine => "routine",
            Self::Elevated => "elevated",
            Self::High => "high",
            Self::Immediate => "immediate",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Public struct `EmergencyContact` used across Haven components.
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

/// Returns the fixed hotline contacts attached to critical recommendations.
pub fn crisis_hotline_contacts() -> Vec<EmergencyContact> {
    vec![
        EmergencyContact {
            name: "988 Suicide & Crisis Lifeline".to_string(),
            phone: CRISIS_HOTLINE_CALL.to_string(),
        },
        EmergencyContact {
            name: "Crisis Text Line (text HOME)".to_string(),
            phone: CRISIS_TEXT_LINE.to_string(),
        },
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// User-facing guidance derived purely from the tier.
pub struct Recommendation {
    pub message: String,
    pub actions: Vec<RecommendedAction>,
    pub urgency: RecommendationUrgency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contacts: Option<Vec<EmergencyContact>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Immutable result of one assessment pass; persisted as an audit log row.
pub struct CrisisAssessment {
    pub score: f64,
    pub tier: RiskTier,
    pub signals: Vec<RiskSignal>,
    pub recommendation: Recommendation,
    pub created_unix_ms: u64,
}
