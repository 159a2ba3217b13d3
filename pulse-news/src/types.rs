//! Wire types for the NewsAPI-shaped provider response
//!
//! All fields are optional: a malformed record must never poison the
//! rest of the page, so parsing is as tolerant as possible and the
//! mapping layer decides what to skip.

use serde::Deserialize;

/// Top-level provider response
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewsApiResponse {
    /// Provider status string ("ok" / "error")
    pub status: Option<String>,
    /// Total results available across pages
    pub total_results: Option<u64>,
    /// The page of articles
    pub articles: Vec<NewsApiArticle>,
}

/// One provider article record
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewsApiArticle {
    pub source: Option<NewsApiSource>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    /// Vendor-specific image field; mapped to `image_url`
    pub url_to_image: Option<String>,
    /// ISO-8601 timestamp; left as a string so one bad date cannot fail
    /// the whole page deserialization
    pub published_at: Option<String>,
    pub content: Option<String>,
    /// Rarely present on this endpoint
    pub category: Option<String>,
}

/// Provider source descriptor
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewsApiSource {
    pub id: Option<String>,
    pub name: Option<String>,
}
