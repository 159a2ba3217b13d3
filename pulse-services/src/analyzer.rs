//! Sentiment analysis
//!
//! One interface, two interchangeable implementations selected by
//! configuration: [`EngineAnalyzer`] wraps a fine-grained per-sentence
//! scoring engine and averages its ordinals; [`KeywordAnalyzer`] is the
//! simple trigger-word rule path. Callers normalize the resulting label
//! before storage.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use pulse_core::{PulseError, PulseResult, SentimentResult};

/// A sentiment analyzer: raw text in, label + score in [0.0, 1.0] out.
#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> PulseResult<SentimentResult>;

    /// Short name for logging and configuration display.
    fn name(&self) -> &'static str;
}

/// Which analyzer implementation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalyzerKind {
    /// Per-sentence ordinal engine, averaged (default)
    #[default]
    Engine,
    /// Trigger-word rule path
    Keyword,
}

impl std::str::FromStr for AnalyzerKind {
    type Err = PulseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "engine" => Ok(AnalyzerKind::Engine),
            "keyword" => Ok(AnalyzerKind::Keyword),
            other => Err(PulseError::config(format!(
                "unknown analyzer '{}' (expected 'engine' or 'keyword')",
                other
            ))),
        }
    }
}

/// Build the configured analyzer.
pub fn build_analyzer(kind: AnalyzerKind) -> Arc<dyn SentimentAnalyzer> {
    match kind {
        AnalyzerKind::Engine => Arc::new(EngineAnalyzer::new()),
        AnalyzerKind::Keyword => Arc::new(KeywordAnalyzer),
    }
}

/// Fine-grained ordinal classes produced by the scoring engine,
/// "very negative" (0) through "very positive" (4).
const VERY_NEGATIVE: u32 = 0;
const NEGATIVE: u32 = 1;
const NEUTRAL: u32 = 2;
const POSITIVE: u32 = 3;
const VERY_POSITIVE: u32 = 4;

/// Valence cues recognized by the embedded scoring engine.
const POSITIVE_CUES: &[&str] = &[
    "good", "great", "excellent", "positive", "strong", "win", "wins", "won", "gain", "gains",
    "growth", "rally", "surge", "soar", "soars", "record", "success", "successful", "boost",
    "improve", "improves", "improved", "optimism", "upbeat", "love", "awesome", "breakthrough",
    "recovery", "profit", "profits", "hope", "celebrate",
];

const NEGATIVE_CUES: &[&str] = &[
    "bad", "terrible", "awful", "negative", "weak", "loss", "losses", "lose", "loses", "lost",
    "drop", "drops", "fall", "falls", "fell", "crash", "crisis", "fear", "fears", "decline",
    "declines", "plunge", "plunges", "slump", "hate", "failure", "fail", "fails", "failed",
    "warning", "threat", "death", "deaths", "disaster", "recession",
];

/// Sentiment analyzer backed by a per-sentence ordinal scoring engine.
///
/// The engine assigns each sentence a class on the five-point scale; the
/// analyzer averages those ordinals (rounded to nearest), maps the
/// average to the canonical three-class set (<=1 Negative, 2 Neutral,
/// >=3 Positive) and scores it as `average / 4.0`.
pub struct EngineAnalyzer;

impl EngineAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Score one sentence on the five-point scale.
    fn score_sentence(sentence: &str) -> u32 {
        let mut positive = 0i32;
        let mut negative = 0i32;

        for word in sentence
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        {
            if POSITIVE_CUES.contains(&word.as_str()) {
                positive += 1;
            } else if NEGATIVE_CUES.contains(&word.as_str()) {
                negative += 1;
            }
        }

        match positive - negative {
            d if d >= 2 => VERY_POSITIVE,
            1 => POSITIVE,
            0 => NEUTRAL,
            -1 => NEGATIVE,
            _ => VERY_NEGATIVE,
        }
    }
}

impl Default for EngineAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SentimentAnalyzer for EngineAnalyzer {
    async fn analyze(&self, text: &str) -> PulseResult<SentimentResult> {
        if text.trim().is_empty() {
            return Ok(SentimentResult::new("Neutral", 0.5));
        }

        let mut total = 0u32;
        let mut count = 0u32;
        for sentence in text
            .split(['.', '!', '?'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            total += Self::score_sentence(sentence);
            count += 1;
        }

        // rounds half up, matching the engine's averaging convention
        let average = if count > 0 {
            (total as f64 / count as f64).round() as u32
        } else {
            NEUTRAL
        };

        let label = if average <= NEGATIVE {
            "Negative"
        } else if average == NEUTRAL {
            "Neutral"
        } else {
            "Positive"
        };
        let score = average as f64 / 4.0;

        debug!(
            "engine sentiment: {} sentences, average ordinal {}, label {}",
            count, average, label
        );

        Ok(SentimentResult::new(label, score))
    }

    fn name(&self) -> &'static str {
        "engine"
    }
}

/// Positive trigger words for the rule path
const POSITIVE_TRIGGERS: &[&str] = &["good", "love", "great", "awesome"];

/// Negative trigger words for the rule path
const NEGATIVE_TRIGGERS: &[&str] = &["bad", "hate", "terrible", "awful"];

/// Simple rule-based analyzer: trigger-word substring match.
pub struct KeywordAnalyzer;

#[async_trait]
impl SentimentAnalyzer for KeywordAnalyzer {
    async fn analyze(&self, text: &str) -> PulseResult<SentimentResult> {
        if text.trim().is_empty() {
            return Ok(SentimentResult::new("NEUTRAL", 0.5));
        }

        let lower = text.to_lowercase();
        if POSITIVE_TRIGGERS.iter().any(|cue| lower.contains(cue)) {
            return Ok(SentimentResult::new("POSITIVE", 0.9));
        }
        if NEGATIVE_TRIGGERS.iter().any(|cue| lower.contains(cue)) {
            return Ok(SentimentResult::new("NEGATIVE", 0.9));
        }
        Ok(SentimentResult::new("NEUTRAL", 0.5))
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_core::SentimentLabel;

    #[tokio::test]
    async fn test_engine_blank_input_is_neutral() {
        let analyzer = EngineAnalyzer::new();
        let result = analyzer.analyze("   ").await.unwrap();
        assert_eq!(result.normalized_label(), SentimentLabel::Neutral);
        assert_eq!(result.score, 0.5);
    }

    #[tokio::test]
    async fn test_engine_positive_text() {
        let analyzer = EngineAnalyzer::new();
        let result = analyzer.analyze("A. great news").await.unwrap();
        assert_eq!(result.normalized_label(), SentimentLabel::Positive);
        assert!(result.score >= 0.75);
    }

    #[tokio::test]
    async fn test_engine_negative_text() {
        let analyzer = EngineAnalyzer::new();
        let result = analyzer
            .analyze("Markets crash amid recession fears. Losses deepen.")
            .await
            .unwrap();
        assert_eq!(result.normalized_label(), SentimentLabel::Negative);
        assert!(result.score <= 0.25);
    }

    #[tokio::test]
    async fn test_engine_neutral_text() {
        let analyzer = EngineAnalyzer::new();
        let result = analyzer
            .analyze("The committee met on Tuesday. A report is expected.")
            .await
            .unwrap();
        assert_eq!(result.normalized_label(), SentimentLabel::Neutral);
        assert_eq!(result.score, 0.5);
    }

    #[tokio::test]
    async fn test_keyword_rules() {
        let analyzer = KeywordAnalyzer;

        let positive = analyzer.analyze("what a great day").await.unwrap();
        assert_eq!(positive.normalized_label(), SentimentLabel::Positive);
        assert_eq!(positive.score, 0.9);

        let negative = analyzer.analyze("this is terrible").await.unwrap();
        assert_eq!(negative.normalized_label(), SentimentLabel::Negative);

        let neutral = analyzer.analyze("nothing to report").await.unwrap();
        assert_eq!(neutral.normalized_label(), SentimentLabel::Neutral);
        assert_eq!(neutral.score, 0.5);
    }

    #[test]
    fn test_analyzer_kind_parsing() {
        assert_eq!("engine".parse::<AnalyzerKind>().unwrap(), AnalyzerKind::Engine);
        assert_eq!("Keyword".parse::<AnalyzerKind>().unwrap(), AnalyzerKind::Keyword);
        assert!("other".parse::<AnalyzerKind>().is_err());
    }
}
