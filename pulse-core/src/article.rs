//! Article data structures for the news ingestion pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sentiment::Sentiment;

/// An article as received from the external provider, before persistence.
///
/// Carries no identity of its own; it exists only within one fetch cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteArticle {
    /// Article title
    pub title: Option<String>,
    /// Canonical article URL
    pub url: Option<String>,
    /// Name of the news source (e.g., "Reuters", "Bloomberg")
    pub source: Option<String>,
    /// Provider category; defaults to "General" when the provider omits it
    pub category: Option<String>,
    /// Brief summary/excerpt
    pub summary: Option<String>,
    /// Article body (often truncated by the provider)
    pub content: Option<String>,
    /// Publication date, when the provider supplied a parseable one
    pub published_at: Option<DateTime<Utc>>,
    /// Article thumbnail/image URL
    pub image_url: Option<String>,
}

/// A persisted, deduplicated news article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier; `Uuid::nil()` until first saved
    pub id: Uuid,
    /// Article title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Article URL, globally unique when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Brief summary/excerpt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Article body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Source name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Publication date
    pub published_at: DateTime<Utc>,
    /// When the pipeline last saw this article; refreshed on every upsert
    pub fetched_at: DateTime<Utc>,
    /// Validated http/https image URL, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Article {
    /// Create an unsaved article with a nil identity.
    ///
    /// The storage layer assigns a real id on first save.
    pub fn new_unsaved() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::nil(),
            title: None,
            url: None,
            summary: None,
            content: None,
            source: None,
            category: None,
            published_at: now,
            fetched_at: now,
            image_url: None,
        }
    }

    /// Whether this article has been assigned a persistent identity.
    pub fn is_saved(&self) -> bool {
        !self.id.is_nil()
    }

    /// Text fed to sentiment analysis: `"{title}. {content}"`, empty
    /// parts tolerated.
    pub fn analysis_text(&self) -> String {
        format!(
            "{}. {}",
            self.title.as_deref().unwrap_or(""),
            self.content.as_deref().unwrap_or("")
        )
    }
}

/// An article together with its sentiment history, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleWithSentiments {
    #[serde(flatten)]
    pub article: Article,
    pub sentiments: Vec<Sentiment>,
}
