//! Article API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use pulse_core::{Article, ArticleWithSentiments};
use pulse_services::{upsert_latest_sentiment, StorageError};

use crate::AppState;

/// Query parameters for article listings
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Shuffle the result order
    #[serde(default)]
    pub shuffle: bool,
    /// Filter by latest sentiment label (All/Positive/Neutral/Negative)
    pub sentiment: Option<String>,
}

/// Create article routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/articles", get(list_articles))
        .route("/api/articles/recent/{count}", get(recent_articles))
        .route("/api/articles/{id}/with-sentiments", get(article_with_sentiments))
        .route("/api/articles/{id}/sentiment", get(latest_sentiment))
        .route("/api/articles/{id}/analyze", post(analyze_article))
}

/// GET /api/articles - list all articles, with optional latest-sentiment
/// filter and shuffle
async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> impl IntoResponse {
    let articles = match state.storage.list_articles() {
        Ok(articles) => articles,
        Err(e) => return storage_failure(e),
    };

    match apply_filters(&state, articles, &params) {
        Ok(filtered) => (StatusCode::OK, Json(serde_json::json!(filtered))).into_response(),
        Err(e) => storage_failure(e),
    }
}

/// GET /api/articles/recent/{count} - the most recently fetched articles
async fn recent_articles(
    State(state): State<AppState>,
    Path(count): Path<i64>,
    Query(params): Query<ListQuery>,
) -> impl IntoResponse {
    if count <= 0 {
        return (StatusCode::BAD_REQUEST, Json(serde_json::json!([]))).into_response();
    }

    let articles = match state.storage.list_recent_articles(count as usize) {
        Ok(articles) => articles,
        Err(e) => return storage_failure(e),
    };

    match apply_filters(&state, articles, &params) {
        Ok(filtered) => (StatusCode::OK, Json(serde_json::json!(filtered))).into_response(),
        Err(e) => storage_failure(e),
    }
}

/// GET /api/articles/{id}/with-sentiments - article plus its sentiment
/// history, newest first
async fn article_with_sentiments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let article = match state.storage.find_article_by_id(id) {
        Ok(Some(article)) => article,
        Ok(None) => return not_found("article not found"),
        Err(e) => return storage_failure(e),
    };

    match state.storage.sentiments_for_article(id) {
        Ok(sentiments) => (
            StatusCode::OK,
            Json(serde_json::json!(ArticleWithSentiments {
                article,
                sentiments
            })),
        )
            .into_response(),
        Err(e) => storage_failure(e),
    }
}

/// GET /api/articles/{id}/sentiment - latest sentiment label + score
async fn latest_sentiment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.storage.find_article_by_id(id) {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("article not found"),
        Err(e) => return storage_failure(e),
    }

    match state.storage.latest_sentiment_for_article(id) {
        Ok(Some(sentiment)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "label": sentiment.label,
                "score": sentiment.score,
            })),
        )
            .into_response(),
        Ok(None) => not_found("no sentiment found for this article"),
        Err(e) => storage_failure(e),
    }
}

/// POST /api/articles/{id}/analyze - run the configured analyzer on one
/// article and upsert its latest sentiment
async fn analyze_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let article = match state.storage.find_article_by_id(id) {
        Ok(Some(article)) => article,
        Ok(None) => return not_found("article not found"),
        Err(e) => return storage_failure(e),
    };

    let result = match state.analyzer.analyze(&article.analysis_text()).await {
        Ok(result) => result,
        Err(e) => {
            warn!("sentiment analysis failed for article {}: {}", id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "sentiment analysis failed"})),
            )
                .into_response();
        }
    };

    let label = result.normalized_label();
    let score = result.score.clamp(0.0, 1.0);
    match upsert_latest_sentiment(&state.storage, id, label, score) {
        Ok(saved) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "label": saved.label,
                "score": saved.score,
            })),
        )
            .into_response(),
        Err(e) => storage_failure(e),
    }
}

/// Apply the latest-sentiment filter and optional shuffle to a listing.
fn apply_filters(
    state: &AppState,
    mut articles: Vec<Article>,
    params: &ListQuery,
) -> Result<Vec<Article>, StorageError> {
    if let Some(wanted) = params
        .sentiment
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
    {
        let mut filtered = Vec::new();
        for article in articles {
            let latest = state.storage.latest_sentiment_for_article(article.id)?;
            if latest.is_some_and(|s| s.label.as_str().eq_ignore_ascii_case(wanted)) {
                filtered.push(article);
            }
        }
        articles = filtered;
    }

    if params.shuffle {
        articles.shuffle(&mut rand::rng());
    }

    Ok(articles)
}

fn not_found(message: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": message})),
    )
        .into_response()
}

fn storage_failure(e: StorageError) -> axum::response::Response {
    error!("storage error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": "storage failure"})),
    )
        .into_response()
}
