//! Crisis risk scoring building blocks for Haven.
//!
//! Provides the signal extractors (keyword, mood, AI sentiment, voice,
//! history), the clamped risk aggregator, and tier classification consumed by
//! the escalation runtime. Extraction and aggregation are pure: the only
//! inputs are the caller-supplied evidence sources plus a caller-supplied
//! clock, and no extractor failure ever aborts an assessment.

pub mod risk_assess;
pub mod risk_contract;
pub mod risk_history;
pub mod risk_keyword;
pub mod risk_signals;

pub use risk_assess::*;
pub use risk_contract::*;
pub use risk_history::*;
pub use risk_keyword::*;
pub use risk_signals::*;
