//! Image proxy
//!
//! Streams remote image bytes back to the browser, avoiding
//! CORS/hotlink blocks on article thumbnails. Sends a browser-like
//! User-Agent (many image hosts reject missing ones) and forwards the
//! remote content type.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::warn;

use crate::AppState;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 PulseProxy/1.0";

/// Query parameters for the proxy
#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub url: String,
}

/// Create image routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/images/proxy", get(proxy_image))
}

/// GET /api/images/proxy?url=<encoded-url> - fetch and relay remote
/// image bytes
async fn proxy_image(
    State(state): State<AppState>,
    Query(params): Query<ProxyQuery>,
) -> impl IntoResponse {
    let url = params.url.trim();
    if url.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing 'url' parameter").into_response();
    }

    let response = match state
        .proxy_client
        .get(url)
        .header(header::USER_AGENT, BROWSER_USER_AGENT)
        .header(header::ACCEPT, "*/*")
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            warn!("image proxy request failed for {}: {}", url, e);
            return (StatusCode::BAD_GATEWAY, "Failed to fetch remote image").into_response();
        }
    };

    let status = response.status();
    if !status.is_success() {
        warn!("remote returned {} for {}", status, url);
        let code = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        return (code, format!("Remote returned {} for {}", status, url)).into_response();
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let body = match response.bytes().await {
        Ok(body) if !body.is_empty() => body,
        Ok(_) => {
            return (StatusCode::BAD_GATEWAY, "Remote returned an empty body").into_response();
        }
        Err(e) => {
            warn!("failed to read remote image body for {}: {}", url, e);
            return (StatusCode::BAD_GATEWAY, "Failed to read remote image").into_response();
        }
    };

    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    // let browsers and proxies cache for an hour
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=3600"),
    );

    (StatusCode::OK, headers, body).into_response()
}
