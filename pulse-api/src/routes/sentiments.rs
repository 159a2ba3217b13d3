//! Sentiment API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use pulse_core::Sentiment;
use pulse_services::{KeywordAnalyzer, SentimentAnalyzer};

use crate::AppState;

/// Request body for ad-hoc text analysis
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: String,
    /// When present, the result is persisted as a new sentiment row
    pub article_id: Option<Uuid>,
}

/// Create sentiment routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/sentiments/article/{article_id}", get(sentiments_for_article))
        .route("/api/sentiments/analyze", post(analyze_text))
}

/// GET /api/sentiments/article/{article_id} - all sentiments for an
/// article, newest first
async fn sentiments_for_article(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.storage.sentiments_for_article(article_id) {
        Ok(sentiments) if sentiments.is_empty() => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("No sentiments found for article id: {}", article_id)
            })),
        )
            .into_response(),
        Ok(sentiments) => (StatusCode::OK, Json(serde_json::json!(sentiments))).into_response(),
        Err(e) => {
            error!("storage error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "storage failure"})),
            )
                .into_response()
        }
    }
}

/// POST /api/sentiments/analyze - rule-based analysis of arbitrary text;
/// optionally appends a sentiment row for an article.
///
/// This is the secondary, keyword-rule entry point. It deliberately
/// appends a fresh row (seeding the history trail) instead of going
/// through the pipeline's upsert-latest rule.
async fn analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    let analyzer = KeywordAnalyzer;
    let result = match analyzer.analyze(&request.text).await {
        Ok(result) => result,
        Err(e) => {
            error!("keyword analysis failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "analysis failed"})),
            )
                .into_response();
        }
    };

    let label = result.normalized_label();
    let mut body = serde_json::json!({
        "label": label,
        "score": result.score,
        "text": request.text,
        "saved": false,
    });

    if let Some(article_id) = request.article_id {
        match state.storage.find_article_by_id(article_id) {
            Ok(Some(_)) => {}
            Ok(None) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": format!("Article not found for id: {}", article_id)
                    })),
                )
                    .into_response();
            }
            Err(e) => {
                error!("storage error: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": "storage failure"})),
                )
                    .into_response();
            }
        }

        match state
            .storage
            .save_sentiment(&Sentiment::new_unsaved(article_id, label, result.score))
        {
            Ok(saved) => {
                body["saved"] = serde_json::json!(true);
                body["sentiment"] = serde_json::json!(saved);
            }
            Err(e) => {
                error!("failed to save sentiment: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": "failed to save sentiment"})),
                )
                    .into_response();
            }
        }
    }

    (StatusCode::OK, Json(body)).into_response()
}
