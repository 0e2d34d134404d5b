//! Mood, AI-sentiment, and voice signal extractors.

use crate::risk_contract::{
    AiCrisisScore, RiskSignal, RiskSignalSource, VoiceMoodInput, VoiceMoodLabel, RISK_SCORE_MAX,
};
use crate::risk_keyword::KeywordMatcher;

/// Weight applied to the externally computed AI crisis score.
pub const AI_SCORE_WEIGHT: f64 = 0.7;
/// Voice transcripts contribute half of their keyword score.
pub const VOICE_TRANSCRIPT_WEIGHT: f64 = 0.5;
/// Confidence below this adds the low-confidence bonus.
pub const VOICE_LOW_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Maps the 1–5 mood rating to a contribution.
///
/// The two branches are deliberately non-exclusive: a rating of 1 accrues
/// both (+3 and +2, total +5). Downstream tier thresholds depend on this
/// accumulation, so the branches must not be collapsed into an if/else.
pub fn extract_mood_signal(mood: u8) -> RiskSignal {
    let mut contribution = 0.0;
    let mut evidence = Vec::new();
    if mood == 1 {
        contribution += 3.0;
        evidence.push("mood rating 1/5".to_string());
    }
    if mood <= 2 {
        contribution += 2.0;
        evidence.push(format!("low mood rating {mood}/5"));
    }
    RiskSignal {
        source: RiskSignalSource::Mood,
        contribution,
        evidence,
    }
}

/// Adapts the AI crisis estimate into a signal. A missing estimate (provider
/// error, timeout, or the adapter being disabled) degrades to a zero
/// contribution with no evidence rather than aborting the assessment.
pub fn extract_ai_signal(ai: Option<&AiCrisisScore>) -> RiskSignal {
    let Some(estimate) = ai else {
        return RiskSignal::empty(RiskSignalSource::AiSentiment);
    };
    let bounded = estimate.crisis_score.clamp(0.0, RISK_SCORE_MAX);
    let contribution = (bounded * AI_SCORE_WEIGHT).round();
    let mut evidence = vec![format!("ai crisis score {bounded:.1}")];
    let sentiment = estimate.sentiment.trim();
    if !sentiment.is_empty() {
        evidence.push(format!("ai sentiment {sentiment}"));
    }
    RiskSignal {
        source: RiskSignalSource::AiSentiment,
        contribution,
        evidence,
    }
}

fn voice_mood_bonus(label: VoiceMoodLabel) -> f64 {
    match label {
        VoiceMoodLabel::Sad => 2.0,
        VoiceMoodLabel::Anxious => 1.5,
        VoiceMoodLabel::Angry => 1.0,
        VoiceMoodLabel::Calm | VoiceMoodLabel::Neutral | VoiceMoodLabel::Unrecognized => 0.0,
    }
}

/// Extracts the optional voice signal. Absent input yields `None` so the
/// aggregator never counts a placeholder zero for a source that did not run.
pub fn extract_voice_signal(
    matcher: &KeywordMatcher,
    voice: Option<&VoiceMoodInput>,
) -> Option<RiskSignal> {
    let input = voice?;
    let transcript_scan = matcher.scan(&input.transcript);
    let mut raw = transcript_scan.contribution * VOICE_TRANSCRIPT_WEIGHT;
    let mut evidence = transcript_scan
        .evidence
        .into_iter()
        .map(|entry| format!("transcript: {entry}"))
        .collect::<Vec<_>>();

    let mood_bonus = voice_mood_bonus(input.detected_mood);
    if mood_bonus > 0.0 {
        raw += mood_bonus;
        evidence.push(format!("voice mood {}", input.detected_mood.as_str()));
    }
    if input.confidence < VOICE_LOW_CONFIDENCE_THRESHOLD {
        raw += 1.0;
        evidence.push(format!(
            "low voice analysis confidence {:.2}",
            input.confidence
        ));
    }

    Some(RiskSignal {
        source: RiskSignalSource::Voice,
        contribution: raw.round(),
        evidence,
    })
}
