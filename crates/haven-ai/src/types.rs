use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `SentimentLabel` values.
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
    Crisis,
}

impl SentimentLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
            Self::Crisis => "crisis",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `ContextRole` values.
pub enum ContextRole {
    User,
    Companion,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One prior conversation turn. Context is passed explicitly per call; the
/// adapter holds no conversation state of its own.
pub struct ContextTurn {
    pub role: ContextRole,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Public struct `CrisisSignalRequest` used across Haven components.
pub struct CrisisSignalRequest {
    pub message_text: String,
    pub mood: u8,
    #[serde(default)]
    pub context: Vec<ContextTurn>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Provider verdict: a 0–10 crisis score plus a coarse sentiment label.
pub struct CrisisSignalEstimate {
    pub crisis_score: f64,
    pub sentiment: SentimentLabel,
}

#[derive(Debug, Error)]
/// Enumerates supported `HavenAiError` values.
pub enum HavenAiError {
    #[error("provider api key is missing")]
    MissingApiKey,
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned status {status}: {detail}")]
    Provider { status: u16, detail: String },
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
/// Seam between the engine and whichever model computes the crisis score.
pub trait CrisisSignalProvider: Send + Sync {
    async fn evaluate(
        &self,
        request: &CrisisSignalRequest,
    ) -> Result<CrisisSignalEstimate, HavenAiError>;
}
