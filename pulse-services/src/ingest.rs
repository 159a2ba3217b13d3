//! Ingestion cycle orchestration
//!
//! One pass per scheduler trigger: fetch a page from the provider,
//! resolve/merge/save each record, enrich the saved article with a
//! sentiment via the upsert-latest rule, and broadcast it to live
//! subscribers. Every per-record stage is isolated: a failure is logged
//! and the rest of the batch proceeds. Only an empty fetch ends a cycle
//! early.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use pulse_core::{Article, Sentiment, SentimentLabel};
use pulse_news::NewsApiClient;

use crate::analyzer::SentimentAnalyzer;
use crate::broadcast::ArticleBroadcaster;
use crate::resolver::resolve_remote;
use crate::storage::{NewsStorage, StorageError};

/// Default cap on records processed per cycle
pub const DEFAULT_MAX_PER_CYCLE: usize = 50;

/// Update the most recent sentiment row for an article, or insert one.
///
/// The pipeline re-analyzes articles every cycle; mutating the latest
/// row instead of appending keeps periodic re-analysis from growing the
/// table without bound, while history rows seeded by other entry points
/// stay untouched.
pub fn upsert_latest_sentiment(
    storage: &NewsStorage,
    article_id: Uuid,
    label: SentimentLabel,
    score: f64,
) -> Result<Sentiment, StorageError> {
    let sentiment = match storage.latest_sentiment_for_article(article_id)? {
        Some(mut latest) => {
            latest.label = label;
            latest.score = score;
            latest.created_at = Utc::now();
            latest
        }
        None => Sentiment::new_unsaved(article_id, label, score),
    };
    storage.save_sentiment(&sentiment)
}

/// One ingestion pass over a provider page
pub struct IngestService {
    provider: NewsApiClient,
    storage: Arc<NewsStorage>,
    analyzer: Arc<dyn SentimentAnalyzer>,
    broadcaster: Arc<ArticleBroadcaster>,
    max_per_cycle: usize,
}

impl IngestService {
    pub fn new(
        provider: NewsApiClient,
        storage: Arc<NewsStorage>,
        analyzer: Arc<dyn SentimentAnalyzer>,
        broadcaster: Arc<ArticleBroadcaster>,
        max_per_cycle: usize,
    ) -> Self {
        Self {
            provider,
            storage,
            analyzer,
            broadcaster,
            max_per_cycle,
        }
    }

    /// Run one ingestion cycle. Returns the number of records processed.
    pub async fn run_cycle(&self) -> usize {
        let remote_page = self.provider.fetch_page().await;

        if remote_page.is_empty() {
            info!("no remote articles returned from provider (empty or rate-limited)");
            return 0;
        }

        info!("fetched {} remote articles; upserting", remote_page.len());

        let mut processed = 0;
        for (index, record) in remote_page.iter().enumerate() {
            if processed >= self.max_per_cycle {
                warn!(
                    "per-cycle cap ({}) reached; skipping {} remaining record(s)",
                    self.max_per_cycle,
                    remote_page.len() - index
                );
                break;
            }

            let article = match resolve_remote(&self.storage, record) {
                Ok(article) => article,
                Err(e) => {
                    warn!(
                        "failed to upsert article '{}' ({}): {}",
                        record.title.as_deref().unwrap_or("<untitled>"),
                        record.url.as_deref().unwrap_or("no url"),
                        e
                    );
                    continue;
                }
            };

            self.enrich(&article).await;

            // broadcast after persistence; a failure here never rolls
            // anything back
            self.broadcaster.publish(&article);

            processed += 1;
        }

        info!("poll cycle finished; articles processed: {}", processed);
        processed
    }

    /// Analyze and persist sentiment for a saved article. Best-effort:
    /// the article stays saved even when this fails.
    async fn enrich(&self, article: &Article) {
        let title = article.title.as_deref().unwrap_or("<untitled>");

        match self.analyzer.analyze(&article.analysis_text()).await {
            Ok(result) => {
                let label = result.normalized_label();
                let score = result.score.clamp(0.0, 1.0);
                match upsert_latest_sentiment(&self.storage, article.id, label, score) {
                    Ok(saved) => debug!(
                        "sentiment saved for '{}': {} ({:.2})",
                        title, saved.label, saved.score
                    ),
                    Err(e) => warn!("failed to save sentiment for '{}': {}", title, e),
                }
            }
            Err(e) => warn!("sentiment analysis failed for '{}': {}", title, e),
        }
    }

    /// The storage behind this service.
    pub fn storage(&self) -> &Arc<NewsStorage> {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_latest_updates_in_place() {
        let storage = NewsStorage::new_in_memory().unwrap();
        let mut article = Article::new_unsaved();
        article.title = Some("Story".to_string());
        article.url = Some("https://news.test/1".to_string());
        let article = storage.save_article(&article).unwrap();

        let first =
            upsert_latest_sentiment(&storage, article.id, SentimentLabel::Neutral, 0.5).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        let second =
            upsert_latest_sentiment(&storage, article.id, SentimentLabel::Positive, 0.75).unwrap();

        // one row total, mutated in place with a refreshed timestamp
        assert_eq!(first.id, second.id);
        assert!(second.created_at > first.created_at);

        let all = storage.sentiments_for_article(article.id).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].label, SentimentLabel::Positive);
        assert_eq!(all[0].score, 0.75);
    }

    #[test]
    fn test_upsert_latest_targets_only_the_newest_row() {
        let storage = NewsStorage::new_in_memory().unwrap();
        let mut article = Article::new_unsaved();
        article.url = Some("https://news.test/1".to_string());
        let article = storage.save_article(&article).unwrap();

        // seed history the way a manual analysis entry point would
        let mut old = Sentiment::new_unsaved(article.id, SentimentLabel::Negative, 0.25);
        old.created_at = Utc::now() - chrono::Duration::hours(1);
        storage.save_sentiment(&old).unwrap();
        let seed = storage
            .save_sentiment(&Sentiment::new_unsaved(
                article.id,
                SentimentLabel::Neutral,
                0.5,
            ))
            .unwrap();

        let updated =
            upsert_latest_sentiment(&storage, article.id, SentimentLabel::Positive, 0.9).unwrap();

        // the newest row was mutated; the history row survived
        assert_eq!(updated.id, seed.id);
        let all = storage.sentiments_for_article(article.id).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].label, SentimentLabel::Positive);
        assert_eq!(all[1].label, SentimentLabel::Negative);
    }
}
