use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::sleep;

use crate::retry::{is_retryable_http_error, next_backoff_ms, should_retry_status};
use crate::types::{
    ContextRole, CrisisSignalEstimate, CrisisSignalProvider, CrisisSignalRequest, HavenAiError,
    SentimentLabel,
};

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

const CRISIS_SCORE_MAX: f64 = 10.0;

#[derive(Debug, Clone)]
/// Public struct `GeminiConfig` used across Haven components.
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub request_timeout_ms: u64,
    pub max_retries: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            api_key: String::new(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            request_timeout_ms: 8_000,
            max_retries: 2,
        }
    }
}

#[derive(Debug, Clone)]
/// Public struct `GeminiClient` used across Haven components.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, HavenAiError> {
        if config.api_key.trim().is_empty() {
            return Err(HavenAiError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(
                config.request_timeout_ms.max(1),
            ))
            .build()?;

        Ok(Self { client, config })
    }

    fn generate_content_url(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{base}/models/{}:generateContent", self.config.model)
    }
}

fn build_crisis_prompt(request: &CrisisSignalRequest) -> String {
    let mut prompt = String::from(
        "You assess crisis risk for a mental-wellness companion. Given the user's \
         latest message and mood rating, respond with ONLY a JSON object of the form \
         {\"crisis_score\": <number 0-10>, \"sentiment\": \
         \"positive|neutral|negative|crisis\"}.\n",
    );
    for turn in &request.context {
        let speaker = match turn.role {
            ContextRole::User => "user",
            ContextRole::Companion => "companion",
        };
        prompt.push_str(&format!("{speaker}: {}\n", turn.text));
    }
    prompt.push_str(&format!(
        "mood rating: {}/5\nlatest message: {}\n",
        request.mood, request.message_text
    ));
    prompt
}

fn build_generate_content_body(request: &CrisisSignalRequest) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{"text": build_crisis_prompt(request)}],
        }],
        "generationConfig": {
            "temperature": 0.0,
            "responseMimeType": "application/json",
        },
    })
}

fn parse_sentiment(raw: &str) -> SentimentLabel {
    match raw.trim().to_ascii_lowercase().as_str() {
        "positive" => SentimentLabel::Positive,
        "negative" => SentimentLabel::Negative,
        "crisis" => SentimentLabel::Crisis,
        _ => SentimentLabel::Neutral,
    }
}

fn parse_generate_content_response(raw: &str) -> Result<CrisisSignalEstimate, HavenAiError> {
    let envelope = serde_json::from_str::<Value>(raw)
        .map_err(|error| HavenAiError::MalformedResponse(error.to_string()))?;
    let text = envelope
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .and_then(|parts| parts.first())
        .and_then(|part| part.get("text"))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            HavenAiError::MalformedResponse("response carries no candidate text".to_string())
        })?;

    // Models occasionally wrap JSON output in a markdown fence even when a
    // JSON mime type was requested.
    let trimmed = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let verdict = serde_json::from_str::<Value>(trimmed)
        .map_err(|error| HavenAiError::MalformedResponse(format!("verdict not JSON: {error}")))?;
    let crisis_score = verdict
        .get("crisis_score")
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            HavenAiError::MalformedResponse("verdict is missing crisis_score".to_string())
        })?;
    let sentiment = verdict
        .get("sentiment")
        .and_then(Value::as_str)
        .map(parse_sentiment)
        .unwrap_or(SentimentLabel::Neutral);

    Ok(CrisisSignalEstimate {
        crisis_score: crisis_score.clamp(0.0, CRISIS_SCORE_MAX),
        sentiment,
    })
}

#[async_trait]
impl CrisisSignalProvider for GeminiClient {
    async fn evaluate(
        &self,
        request: &CrisisSignalRequest,
    ) -> Result<CrisisSignalEstimate, HavenAiError> {
        let body = build_generate_content_body(request);
        let url = self.generate_content_url();
        let max_retries = self.config.max_retries;

        for attempt in 0..=max_retries {
            let response = self
                .client
                .post(&url)
                .query(&[("key", self.config.api_key.as_str())])
                .json(&body)
                .send()
                .await;

            match response {
                Ok(response) => {
                    let status = response.status();
                    let raw = response.text().await?;
                    if status.is_success() {
                        return parse_generate_content_response(&raw);
                    }
                    if attempt < max_retries && should_retry_status(status.as_u16()) {
                        sleep(std::time::Duration::from_millis(next_backoff_ms(attempt))).await;
                        continue;
                    }
                    return Err(HavenAiError::Provider {
                        status: status.as_u16(),
                        detail: raw,
                    });
                }
                Err(error) => {
                    if attempt < max_retries && is_retryable_http_error(&error) {
                        sleep(std::time::Duration::from_millis(next_backoff_ms(attempt))).await;
                        continue;
                    }
                    return Err(HavenAiError::Http(error));
                }
            }
        }

        Err(HavenAiError::MalformedResponse(
            "request retry loop terminated unexpectedly".to_string(),
        ))
    }
}
