//! Generative-AI crisis-signal adapter for Haven.
//!
//! Wraps a Gemini-compatible endpoint behind the [`CrisisSignalProvider`]
//! trait. The adapter owns its own bounded timeout and retry policy; callers
//! treat a failed evaluation as a degraded (zero-contribution) signal, never
//! as an assessment failure.

mod gemini;
mod retry;
mod types;

pub use gemini::{GeminiClient, GeminiConfig, DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};
pub use retry::{is_retryable_http_error, next_backoff_ms, should_retry_status, BASE_BACKOFF_MS};
pub use types::{
    ContextRole, ContextTurn, CrisisSignalEstimate, CrisisSignalProvider, CrisisSignalRequest,
    HavenAiError, SentimentLabel,
};
