//! Pulse API Server
//!
//! HTTP API server over the news sentiment pipeline: serves stored
//! articles and sentiments, streams freshly ingested articles over SSE,
//! proxies article images, and hosts the background polling loop.

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use pulse_news::{NewsApiClient, NewsApiConfig};
use pulse_services::{
    build_analyzer, AnalyzerKind, ArticleBroadcaster, IngestService, NewsPoller, NewsStorage,
    PollerConfig, SentimentAnalyzer,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<NewsStorage>,
    pub analyzer: Arc<dyn SentimentAnalyzer>,
    pub broadcaster: Arc<ArticleBroadcaster>,
    /// Client used by the image proxy
    pub proxy_client: reqwest::Client,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from a .env file, if present
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pulse_api=debug")),
        )
        .init();

    info!("Starting Pulse API");

    // Provider configuration
    let api_key = std::env::var("NEWSAPI_KEY").ok().filter(|k| !k.trim().is_empty());
    if api_key.is_some() {
        info!("News provider API credentials found in environment");
    } else {
        warn!("No NEWSAPI_KEY found - polling will fetch empty pages until one is configured");
    }
    let provider_config = NewsApiConfig {
        base_url: std::env::var("NEWSAPI_URL")
            .unwrap_or_else(|_| pulse_news::newsapi::DEFAULT_ENDPOINT.to_string()),
        api_key,
        ..NewsApiConfig::default()
    };

    // Storage
    let db_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "data/pulse.db".to_string());
    info!("Initializing news storage at: {}", db_path);
    let storage = Arc::new(NewsStorage::new(&db_path)?);

    // Analyzer selection
    let analyzer_kind = match std::env::var("ANALYZER") {
        Ok(raw) => raw.parse::<AnalyzerKind>().unwrap_or_else(|e| {
            warn!("{}; falling back to the engine analyzer", e);
            AnalyzerKind::Engine
        }),
        Err(_) => AnalyzerKind::Engine,
    };
    let analyzer = build_analyzer(analyzer_kind);
    info!("Using '{}' sentiment analyzer", analyzer.name());

    // Broadcast sink for live subscribers
    let broadcaster = Arc::new(ArticleBroadcaster::default());

    // Ingestion service + scheduler
    let max_per_cycle = env_usize("MAX_ARTICLES_PER_POLL", pulse_services::ingest::DEFAULT_MAX_PER_CYCLE);
    let ingest = Arc::new(IngestService::new(
        NewsApiClient::new(provider_config),
        Arc::clone(&storage),
        Arc::clone(&analyzer),
        Arc::clone(&broadcaster),
        max_per_cycle,
    ));

    let poller_config = PollerConfig {
        interval: Duration::from_millis(env_u64("POLL_INTERVAL_MS", 45_000)),
        enabled: env_bool("POLLING_ENABLED", true),
    };
    let poller = NewsPoller::spawn(ingest, poller_config);

    // HTTP server
    let state = AppState {
        storage,
        analyzer,
        broadcaster,
        proxy_client: reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(8))
            .timeout(Duration::from_secs(12))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(routes::api_routes())
        .layer(cors)
        .with_state(state);

    let port = env_u64("PORT", 8080) as u16;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down; stopping poller");
    if let Err(e) = poller.stop().await {
        warn!("Failed to stop poller cleanly: {}", e);
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
