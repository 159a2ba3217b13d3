//! NewsAPI-shaped provider client
//!
//! Fetches one page of top headlines per call. HTTP outcomes are
//! classified into success, rate-limited, server error, client error and
//! transport error; rate limits and server/transport errors are retried
//! with exponential backoff (honoring a `Retry-After` hint), client
//! errors are not. `fetch_page` never raises: on irrecoverable failure it
//! returns an empty page and the caller logs and continues.

use chrono::DateTime;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use pulse_core::RemoteArticle;

use crate::backoff::compute_backoff;
use crate::error::NewsError;
use crate::types::{NewsApiArticle, NewsApiResponse};

/// Default provider endpoint
pub const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/top-headlines";

/// Default page size; kept small to stay clear of provider rate limits
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Maximum fetch attempts per cycle
pub const MAX_RETRIES: u32 = 3;

/// Configuration for the provider client
#[derive(Debug, Clone)]
pub struct NewsApiConfig {
    /// Provider endpoint URL
    pub base_url: String,
    /// API key; a missing key short-circuits fetches to an empty page
    pub api_key: Option<String>,
    /// Articles requested per page
    pub page_size: usize,
    /// Attempt cap per fetch cycle
    pub max_retries: u32,
}

impl Default for NewsApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_retries: MAX_RETRIES,
        }
    }
}

/// How a failed attempt should be handled by the retry loop
enum FetchFailure {
    /// Back off and try again (rate limit, 5xx, transport, parse)
    Retryable {
        error: NewsError,
        retry_after_secs: Option<u64>,
    },
    /// Give up immediately (other 4xx)
    NonRetryable(NewsError),
}

/// Client for the external news provider
pub struct NewsApiClient {
    client: Client,
    config: NewsApiConfig,
}

impl NewsApiClient {
    /// Create a new provider client with bounded request timeouts.
    pub fn new(config: NewsApiConfig) -> Self {
        Self {
            client: Client::builder()
                .connect_timeout(std::time::Duration::from_secs(5))
                .timeout(std::time::Duration::from_secs(10))
                .user_agent("PulseNewsFetcher/1.0")
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
        }
    }

    /// Fetch one page of articles from the provider.
    ///
    /// Retries rate limits and server/transport errors up to the attempt
    /// cap, then returns whatever was accumulated (empty if nothing).
    /// Never returns an error to the caller.
    pub async fn fetch_page(&self) -> Vec<RemoteArticle> {
        let api_key = match self
            .config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
        {
            Some(key) => key,
            None => {
                warn!("news provider API key is not configured; skipping fetch");
                return Vec::new();
            }
        };

        let url = format!("{}?pageSize={}", self.config.base_url, self.config.page_size);

        let mut attempt = 0;
        while attempt < self.config.max_retries {
            attempt += 1;
            match self.attempt_fetch(&url, api_key).await {
                Ok(articles) => {
                    info!("fetched {} articles from provider", articles.len());
                    return articles;
                }
                Err(FetchFailure::NonRetryable(error)) => {
                    warn!(
                        "non-retryable provider error (attempt {}/{}): {}",
                        attempt, self.config.max_retries, error
                    );
                    return Vec::new();
                }
                Err(FetchFailure::Retryable {
                    error,
                    retry_after_secs,
                }) => {
                    if attempt >= self.config.max_retries {
                        break;
                    }
                    let wait = compute_backoff(attempt, retry_after_secs);
                    warn!(
                        "provider error (attempt {}/{}): {}. Backing off {:?} (Retry-After: {:?})",
                        attempt, self.config.max_retries, error, wait, retry_after_secs
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }

        warn!(
            "exceeded max retries ({}) calling the news provider; returning empty page",
            self.config.max_retries
        );
        Vec::new()
    }

    /// One fetch attempt: send, classify the status, parse and map.
    async fn attempt_fetch(
        &self,
        url: &str,
        api_key: &str,
    ) -> Result<Vec<RemoteArticle>, FetchFailure> {
        let response = self
            .client
            .get(url)
            .header("X-Api-Key", api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchFailure::Retryable {
                error: NewsError::RequestFailed(e.to_string()),
                retry_after_secs: None,
            })?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get("Retry-After")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok());
            return Err(FetchFailure::Retryable {
                error: NewsError::RateLimited,
                retry_after_secs,
            });
        }

        if status.is_server_error() {
            return Err(FetchFailure::Retryable {
                error: NewsError::ApiError {
                    status: status.as_u16(),
                    message: "server error".to_string(),
                },
                retry_after_secs: None,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchFailure::NonRetryable(NewsError::ApiError {
                status: status.as_u16(),
                message: body,
            }));
        }

        let parsed: NewsApiResponse =
            response.json().await.map_err(|e| FetchFailure::Retryable {
                error: NewsError::ParseError(e.to_string()),
                retry_after_secs: None,
            })?;

        debug!(
            "provider response: status={:?}, totalResults={:?}, page={}",
            parsed.status,
            parsed.total_results,
            parsed.articles.len()
        );

        Ok(parsed
            .articles
            .into_iter()
            .filter_map(map_article)
            .collect())
    }
}

/// Map one provider record into a [`RemoteArticle`].
///
/// Records without a title are dropped. A malformed `publishedAt` is
/// logged and cleared rather than failing the record, and the vendor
/// `urlToImage` field becomes `image_url`.
fn map_article(raw: NewsApiArticle) -> Option<RemoteArticle> {
    let title = non_blank(raw.title)?;

    let published_at = raw.published_at.as_deref().and_then(|text| {
        match DateTime::parse_from_rfc3339(text) {
            Ok(parsed) => Some(parsed.with_timezone(&chrono::Utc)),
            Err(e) => {
                debug!("failed to parse publishedAt '{}' for '{}': {}", text, title, e);
                None
            }
        }
    });

    Some(RemoteArticle {
        title: Some(title),
        url: non_blank(raw.url),
        source: raw.source.and_then(|s| non_blank(s.name)),
        category: non_blank(raw.category).or_else(|| Some("General".to_string())),
        summary: non_blank(raw.description),
        content: non_blank(raw.content),
        published_at,
        image_url: non_blank(raw.url_to_image),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NewsApiSource;

    fn sample_record() -> NewsApiArticle {
        NewsApiArticle {
            source: Some(NewsApiSource {
                id: None,
                name: Some("Reuters".to_string()),
            }),
            author: None,
            title: Some("Markets rally".to_string()),
            description: Some("A summary".to_string()),
            url: Some("https://reuters.com/markets-rally".to_string()),
            url_to_image: Some("https://reuters.com/image.jpg".to_string()),
            published_at: Some("2026-01-05T10:30:00Z".to_string()),
            content: Some("Full content".to_string()),
            category: None,
        }
    }

    #[test]
    fn test_map_article_full_record() {
        let mapped = map_article(sample_record()).expect("record should map");
        assert_eq!(mapped.title.as_deref(), Some("Markets rally"));
        assert_eq!(mapped.source.as_deref(), Some("Reuters"));
        assert_eq!(mapped.summary.as_deref(), Some("A summary"));
        assert_eq!(
            mapped.image_url.as_deref(),
            Some("https://reuters.com/image.jpg")
        );
        assert_eq!(mapped.category.as_deref(), Some("General"));
        assert!(mapped.published_at.is_some());
    }

    #[test]
    fn test_map_article_skips_missing_title() {
        let mut record = sample_record();
        record.title = None;
        assert!(map_article(record).is_none());

        let mut record = sample_record();
        record.title = Some("   ".to_string());
        assert!(map_article(record).is_none());
    }

    #[test]
    fn test_map_article_tolerates_bad_date() {
        let mut record = sample_record();
        record.published_at = Some("not-a-date".to_string());
        let mapped = map_article(record).expect("record should still map");
        assert!(mapped.published_at.is_none());
    }

    #[test]
    fn test_map_article_blank_fields_become_none() {
        let mut record = sample_record();
        record.description = Some("".to_string());
        record.url_to_image = Some("  ".to_string());
        let mapped = map_article(record).expect("record should map");
        assert!(mapped.summary.is_none());
        assert!(mapped.image_url.is_none());
    }
}
