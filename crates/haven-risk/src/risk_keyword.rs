//! Case-insensitive phrase matching over user text.
//!
//! Phrases are grouped into three severity lists with fixed per-match
//! weights. Matching is substring-based on the full phrase with no stemming,
//! and each phrase contributes at most once per scan regardless of how often
//! it repeats in the text.

use std::collections::BTreeSet;

use aho_corasick::AhoCorasick;
use anyhow::{Context, Result};

use crate::risk_contract::{RiskSignal, RiskSignalSource};

pub const KEYWORD_WEIGHT_CRITICAL: f64 = 5.0;
pub const KEYWORD_WEIGHT_HIGH: f64 = 3.0;
pub const KEYWORD_WEIGHT_MODERATE: f64 = 2.0;

const CRITICAL_PHRASES: &[&str] = &[
    "suicide",
    "kill myself",
    "end my life",
    "want to die",
    "end it all",
    "better off dead",
    "no reason to live",
    "take my own life",
];

const HIGH_PHRASES: &[&str] = &[
    "self harm",
    "self-harm",
    "hurt myself",
    "cutting myself",
    "hopeless",
    "can't go on",
    "cant go on",
    "worthless",
    "give up on everything",
];

const MODERATE_PHRASES: &[&str] = &[
    "depressed",
    "overwhelmed",
    "panic attack",
    "can't sleep",
    "cant sleep",
    "so alone",
    "crying all the time",
    "hate myself",
    "empty inside",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `KeywordSeverity` values.
pub enum KeywordSeverity {
    Critical,
    High,
    Moderate,
}

impl KeywordSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Moderate => "moderate",
        }
    }

    pub fn weight(self) -> f64 {
        match self {
            Self::Critical => KEYWORD_WEIGHT_CRITICAL,
            Self::High => KEYWORD_WEIGHT_HIGH,
            Self::Moderate => KEYWORD_WEIGHT_MODERATE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Outcome of one phrase scan: the weighted contribution plus the matched
/// phrases rendered as `"<phrase> (<severity>)"` evidence strings.
pub struct KeywordScan {
    pub contribution: f64,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone)]
/// Public struct `KeywordMatcher` used across Haven components.
pub struct KeywordMatcher {
    automaton: AhoCorasick,
    phrases: Vec<(&'static str, KeywordSeverity)>,
}

impl KeywordMatcher {
    pub fn new() -> Result<Self> {
        let mut phrases = Vec::new();
        for phrase in CRITICAL_PHRASES {
            phrases.push((*phrase, KeywordSeverity::Critical));
        }
        for phrase in HIGH_PHRASES {
            phrases.push((*phrase, KeywordSeverity::High));
        }
        for phrase in MODERATE_PHRASES {
            phrases.push((*phrase, KeywordSeverity::Moderate));
        }
        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(phrases.iter().map(|(phrase, _)| *phrase))
            .context("failed to build crisis keyword automaton")?;
        Ok(Self { automaton, phrases })
    }

    /// Scans `text` and returns the weighted contribution. Each configured
    /// phrase counts at most once.
    pub fn scan(&self, text: &str) -> KeywordScan {
        let mut matched = BTreeSet::new();
        for found in self.automaton.find_iter(text) {
            matched.insert(found.pattern().as_usize());
        }

        let mut scan = KeywordScan::default();
        for pattern_index in matched {
            let (phrase, severity) = self.phrases[pattern_index];
            scan.contribution += severity.weight();
            scan.evidence
                .push(format!("{} ({})", phrase, severity.as_str()));
        }
        scan
    }
}

/// Runs the keyword extractor over the user's message text.
pub fn extract_keyword_signal(matcher: &KeywordMatcher, text: &str) -> RiskSignal {
    let scan = matcher.scan(text);
    RiskSignal {
        source: RiskSignalSource::Keyword,
        contribution: scan.contribution,
        evidence: scan.evidence,
    }
}
