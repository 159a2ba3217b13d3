//! Live article broadcast
//!
//! Bounded, best-effort multicast of freshly upserted articles. A slow
//! or absent subscriber never blocks ingestion: the channel drops its
//! oldest buffered item when a receiver lags, and a send with no
//! receivers is simply discarded. Subscribers that arrive late receive
//! only what is still buffered.

use tokio::sync::broadcast;
use tracing::debug;

use pulse_core::Article;

/// Default number of articles buffered per subscriber
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Fan-out channel for freshly upserted articles
pub struct ArticleBroadcaster {
    tx: broadcast::Sender<Article>,
}

impl ArticleBroadcaster {
    /// Create a broadcaster with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an article to all live subscribers. Best-effort and
    /// non-blocking; failures never reach the caller.
    pub fn publish(&self, article: &Article) {
        match self.tx.send(article.clone()) {
            Ok(receivers) => debug!(
                "broadcast article '{}' to {} subscriber(s)",
                article.title.as_deref().unwrap_or("<untitled>"),
                receivers
            ),
            Err(_) => debug!(
                "no live subscribers; dropped broadcast for '{}'",
                article.title.as_deref().unwrap_or("<untitled>")
            ),
        }
    }

    /// Subscribe to the live article stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Article> {
        self.tx.subscribe()
    }

    /// Number of currently attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ArticleBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    fn article(title: &str) -> Article {
        let mut article = Article::new_unsaved();
        article.id = uuid::Uuid::new_v4();
        article.title = Some(title.to_string());
        article
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_articles() {
        let broadcaster = ArticleBroadcaster::new(8);
        let mut rx = broadcaster.subscribe();

        broadcaster.publish(&article("one"));
        broadcaster.publish(&article("two"));

        assert_eq!(rx.recv().await.unwrap().title.as_deref(), Some("one"));
        assert_eq!(rx.recv().await.unwrap().title.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let broadcaster = ArticleBroadcaster::new(8);
        // must not panic or block
        broadcaster.publish(&article("nobody listening"));
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_slow_subscriber_drops_oldest() {
        let broadcaster = ArticleBroadcaster::new(2);
        let mut rx = broadcaster.subscribe();

        broadcaster.publish(&article("one"));
        broadcaster.publish(&article("two"));
        broadcaster.publish(&article("three"));

        // the oldest item was dropped for this lagging receiver
        match rx.recv().await {
            Err(RecvError::Lagged(skipped)) => assert_eq!(skipped, 1),
            other => panic!("expected lag, got {:?}", other),
        }
        assert_eq!(rx.recv().await.unwrap().title.as_deref(), Some("two"));
        assert_eq!(rx.recv().await.unwrap().title.as_deref(), Some("three"));
    }

    #[tokio::test]
    async fn test_late_subscriber_gets_no_replay() {
        let broadcaster = ArticleBroadcaster::new(8);
        broadcaster.publish(&article("before subscribe"));

        let mut rx = broadcaster.subscribe();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
