//! Dedup/upsert resolution for incoming remote articles
//!
//! Decides whether a provider record matches an article already in the
//! store and computes the merged field set. Matching prefers an exact
//! URL hit, then a case-insensitive title+source match, then falls back
//! to a fresh article. The merge never downgrades a real URL to null and
//! never stores a placeholder.

use chrono::Utc;
use tracing::debug;
use url::Url;

use pulse_core::{Article, RemoteArticle};

use crate::storage::{NewsStorage, StorageError};

/// Validate an external URL for storage.
///
/// Accepts syntactically valid http/https URLs only; rejects blank
/// strings, the literal `#`, `about:blank` and any host containing the
/// reserved example domain.
pub fn is_valid_external_url(raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    let lower = trimmed.to_lowercase();
    if lower == "#" || lower == "about:blank" {
        return false;
    }

    let parsed = match Url::parse(trimmed) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }
    match parsed.host_str() {
        Some(host) => !host.to_lowercase().contains("example.com"),
        None => false,
    }
}

/// Resolve a remote record against the store and save the merged result.
///
/// The returned article is always persisted: either a fresh row (dedup
/// miss) or an existing row merged in place.
pub fn resolve_remote(
    storage: &NewsStorage,
    remote: &RemoteArticle,
) -> Result<Article, StorageError> {
    let now = Utc::now();

    let incoming_url = remote
        .url
        .as_deref()
        .map(str::trim)
        .filter(|candidate| is_valid_external_url(candidate));
    let incoming_title = non_blank(remote.title.as_deref());
    let incoming_source = non_blank(remote.source.as_deref());

    // prefer to match by URL when valid
    let mut target = match incoming_url {
        Some(candidate) => storage.find_article_by_url(candidate)?,
        None => None,
    };

    // fallback: match by title+source to avoid near-duplicates
    if target.is_none() {
        if let (Some(title), Some(source)) = (incoming_title, incoming_source) {
            target = storage.list_articles()?.into_iter().find(|existing| {
                existing
                    .title
                    .as_deref()
                    .is_some_and(|t| t.eq_ignore_ascii_case(title))
                    && existing
                        .source
                        .as_deref()
                        .is_some_and(|s| s.eq_ignore_ascii_case(source))
            });
        }
    }

    let mut article = target.unwrap_or_else(Article::new_unsaved);

    // only a validated URL is ever written; an existing URL is never
    // downgraded and a placeholder is never stored
    if let Some(candidate) = incoming_url {
        article.url = Some(candidate.to_string());
    }

    if let Some(title) = incoming_title {
        article.title = Some(title.to_string());
    }
    if let Some(source) = incoming_source {
        article.source = Some(source.to_string());
    }
    if let Some(category) = non_blank(remote.category.as_deref()) {
        article.category = Some(category.to_string());
    }
    if let Some(summary) = non_blank(remote.summary.as_deref()) {
        article.summary = Some(summary.to_string());
    }
    if let Some(content) = non_blank(remote.content.as_deref()) {
        article.content = Some(content.to_string());
    }

    // a brand-new article already defaults published_at to now
    if let Some(published_at) = remote.published_at {
        article.published_at = published_at;
    }
    article.fetched_at = now;

    if let Some(image_candidate) = non_blank(remote.image_url.as_deref()) {
        if is_valid_external_url(image_candidate) {
            article.image_url = Some(image_candidate.to_string());
        } else {
            debug!(
                "rejected invalid incoming imageUrl for '{}': {}",
                article.title.as_deref().unwrap_or("<untitled>"),
                image_candidate
            );
        }
    }

    storage.save_article(&article)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
