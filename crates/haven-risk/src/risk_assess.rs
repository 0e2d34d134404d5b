//! Risk aggregation: combines extracted signals into one clamped score and
//! classifies it into a tier.

use crate::risk_contract::{
    crisis_hotline_contacts, AiCrisisScore, CheckinSnapshot, CrisisAssessment, Recommendation,
    RecommendationUrgency, RecommendedAction, RiskTier, VoiceMoodInput, RISK_SCORE_MAX,
};
use crate::risk_history::extract_history_signal;
use crate::risk_keyword::{extract_keyword_signal, KeywordMatcher};
use crate::risk_signals::{extract_ai_signal, extract_mood_signal, extract_voice_signal};

#[derive(Debug, Clone)]
/// Evidence sources for one assessment pass. The caller supplies the clock so
/// assessment stays a pure function of its inputs.
pub struct RiskAssessmentInput<'a> {
    pub text: &'a str,
    pub mood: u8,
    pub ai: Option<&'a AiCrisisScore>,
    pub voice: Option<&'a VoiceMoodInput>,
    pub history: &'a [CheckinSnapshot],
    pub now_unix_ms: u64,
}

/// Classifies a clamped score into a tier. Thresholds are independent
/// `score >= bound` checks evaluated highest-first, so boundary values land
/// in the higher tier.
pub fn tier_for_score(score: f64) -> RiskTier {
    if score >= 8.0 {
        return RiskTier::Critical;
    }
    if score >= 7.0 {
        return RiskTier::High;
    }
    if score >= 5.0 {
        return RiskTier::Moderate;
    }
    if score >= 3.0 {
        return RiskTier::Low;
    }
    RiskTier::None
}

/// Derives the user-facing recommendation purely from the tier.
pub fn recommendation_for_tier(tier: RiskTier) -> Recommendation {
    match tier {
        RiskTier::None => Recommendation {
            message: "Thanks for checking in. Keep noting how you feel — small check-ins make \
                      patterns easier to spot early."
                .to_string(),
            actions: Vec::new(),
            urgency: RecommendationUrgency::Routine,
            emergency_contacts: None,
        },
        RiskTier::Low => Recommendation {
            message: "It sounds like things feel a little heavy today. A short grounding or \
                      mood exercise can help take the edge off."
                .to_string(),
            actions: vec![
                RecommendedAction::AiSupport,
                RecommendedAction::MoodExercises,
            ],
            urgency: RecommendationUrgency::Routine,
            emergency_contacts: None,
        },
        RiskTier::Moderate => Recommendation {
            message: "You are carrying a lot right now. Talking it through with a peer group \
                      or taking a real self-care break can help."
                .to_string(),
            actions: vec![
                RecommendedAction::AiSupport,
                RecommendedAction::PeerGroups,
                RecommendedAction::SelfCare,
            ],
            urgency: RecommendationUrgency::Elevated,
            emergency_contacts: None,
        },
        RiskTier::High => Recommendation {
            message: "What you are going through sounds really hard, and you should not have \
                      to face it alone. We recommend booking time with a counselor."
                .to_string(),
            actions: vec![
                RecommendedAction::CounselorBooking,
                RecommendedAction::CrisisResources,
                RecommendedAction::PeerSupport,
            ],
            urgency: RecommendationUrgency::High,
            emergency_contacts: None,
        },
        RiskTier::Critical => Recommendation {
            message: "You matter, and you deserve support right now. Please reach out \
                      immediately — call 988 or text HOME to 741741. You do not have to go \
                      through this alone."
                .to_string(),
            actions: vec![
                RecommendedAction::ImmediateCounselor,
                RecommendedAction::EmergencyContacts,
                RecommendedAction::CrisisHotline,
            ],
            urgency: RecommendationUrgency::Immediate,
            emergency_contacts: Some(crisis_hotline_contacts()),
        },
    }
}

/// Runs every extractor, sums the present signals, clamps the score, and
/// derives the tier and recommendation. Infallible: extractor degradation
/// has already happened upstream (a failed AI call arrives as `ai: None`).
pub fn assess_crisis_risk(matcher: &KeywordMatcher, input: &RiskAssessmentInput) -> CrisisAssessment {
    let mut signals = vec![
        extract_keyword_signal(matcher, input.text),
        extract_mood_signal(input.mood),
        extract_ai_signal(input.ai),
    ];
    if let Some(voice_signal) = extract_voice_signal(matcher, input.voice) {
        signals.push(voice_signal);
    }
    signals.push(extract_history_signal(input.history, input.now_unix_ms));

    let raw: f64 = signals.iter().map(|signal| signal.contribution).sum();
    let score = raw.clamp(0.0, RISK_SCORE_MAX);
    let tier = tier_for_score(score);

    CrisisAssessment {
        score,
        tier,
        signals,
        recommendation: recommendation_for_tier(tier),
        created_unix_ms: input.now_unix_ms,
    }
}

/// Flattens signal evidence into the factor strings recorded on escalation
/// events, prefixed by source.
pub fn assessment_factors(assessment: &CrisisAssessment) -> Vec<String> {
    let mut factors = Vec::new();
    for signal in &assessment.signals {
        for entry in &signal.evidence {
            factors.push(format!("{}: {}", signal.source.as_str(), entry));
        }
    }
    factors
}

/// Renders the stable one-line assessment summary used in operator output.
pub fn render_crisis_assessment_report(assessment: &CrisisAssessment) -> String {
    let signals = assessment
        .signals
        .iter()
        .map(|signal| format!("{}:{}", signal.source.as_str(), signal.contribution))
        .collect::<Vec<_>>()
        .join("|");
    let factors = assessment_factors(assessment);
    format!(
        "crisis assessment: score={} tier={} urgency={} signals={} factors={}",
        assessment.score,
        assessment.tier.as_str(),
        assessment.recommendation.urgency.as_str(),
        signals,
        if factors.is_empty() {
            "none".to_string()
        } else {
            factors.join("; ")
        }
    )
}
