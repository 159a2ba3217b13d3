//! Sentiment records and the canonical three-class label set

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical sentiment label.
///
/// Vendor label strings are normalized into this set before anything
/// reaches storage; the store never contains a raw vendor label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }

    /// Normalize an arbitrary vendor label into the canonical set.
    ///
    /// Accepts variants like "Very positive", "POSITIVE", "neg", as well
    /// as bare numeric scores ("0.9" reads as Positive, "0.1" as
    /// Negative). Anything unrecognized is Neutral.
    pub fn normalize(raw: &str) -> Self {
        let s = raw.trim().to_lowercase();
        if s.contains("pos") {
            return SentimentLabel::Positive;
        }
        if s.contains("neg") {
            return SentimentLabel::Negative;
        }
        if let Ok(value) = s.parse::<f64>() {
            if value >= 0.66 {
                return SentimentLabel::Positive;
            }
            if value <= 0.33 {
                return SentimentLabel::Negative;
            }
        }
        SentimentLabel::Neutral
    }

    /// Parse a stored canonical label. Unknown strings fall back through
    /// `normalize`, so a store migrated from older data still reads.
    pub fn from_stored(raw: &str) -> Self {
        match raw {
            "Positive" => SentimentLabel::Positive,
            "Negative" => SentimentLabel::Negative,
            "Neutral" => SentimentLabel::Neutral,
            other => SentimentLabel::normalize(other),
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted sentiment reading attached to an article at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentiment {
    /// Unique identifier; `Uuid::nil()` until first saved
    pub id: Uuid,
    /// Owning article; required, immutable after creation
    pub article_id: Uuid,
    /// Canonical label
    pub label: SentimentLabel,
    /// Confidence/intensity score in [0.0, 1.0]
    pub score: f64,
    /// Creation (or latest-upsert refresh) timestamp
    pub created_at: DateTime<Utc>,
}

impl Sentiment {
    /// Create an unsaved sentiment row for an article.
    pub fn new_unsaved(article_id: Uuid, label: SentimentLabel, score: f64) -> Self {
        Self {
            id: Uuid::nil(),
            article_id,
            label,
            score,
            created_at: Utc::now(),
        }
    }
}

/// Raw analyzer output: a vendor-shaped label plus a score in [0.0, 1.0].
///
/// The label is normalized via [`SentimentLabel::normalize`] before it is
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: String,
    pub score: f64,
}

impl SentimentResult {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }

    /// The canonical label for this result.
    pub fn normalized_label(&self) -> SentimentLabel {
        SentimentLabel::normalize(&self.label)
    }
}
