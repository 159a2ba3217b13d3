//! Live article stream
//!
//! Server-sent events backed by the broadcast sink: each freshly
//! upserted article is pushed to connected subscribers. A lagging
//! subscriber skips dropped items and keeps receiving; nothing is
//! replayed to late joiners.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::{Stream, StreamExt};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;

use crate::AppState;

/// Create stream routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/articles/stream", get(stream_articles))
}

/// GET /api/articles/stream - SSE stream of freshly ingested articles
async fn stream_articles(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.broadcaster.subscribe();

    let stream = BroadcastStream::new(receiver).filter_map(|item| async move {
        match item {
            Ok(article) => match Event::default().event("article").json_data(&article) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    warn!("failed to serialize article for SSE: {}", e);
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!("SSE subscriber lagged; {} article(s) dropped", skipped);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
