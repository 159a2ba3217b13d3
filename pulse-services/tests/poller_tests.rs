use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pulse_news::{NewsApiClient, NewsApiConfig};
use pulse_services::{
    build_analyzer, AnalyzerKind, ArticleBroadcaster, IngestService, NewsPoller, NewsStorage,
    PollerConfig,
};

async fn empty_page_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "totalResults": 0,
            "articles": []
        })))
        .mount(&server)
        .await;
    server
}

fn ingest_for(server: &MockServer) -> Arc<IngestService> {
    let provider = NewsApiClient::new(NewsApiConfig {
        base_url: format!("{}/v2/top-headlines", server.uri()),
        api_key: Some("test-key".to_string()),
        page_size: 20,
        max_retries: 1,
    });
    Arc::new(IngestService::new(
        provider,
        Arc::new(NewsStorage::new_in_memory().unwrap()),
        build_analyzer(AnalyzerKind::Keyword),
        Arc::new(ArticleBroadcaster::default()),
        50,
    ))
}

#[tokio::test]
async fn enabled_poller_triggers_repeated_cycles() {
    let server = empty_page_server().await;
    let handle = NewsPoller::spawn(
        ingest_for(&server),
        PollerConfig {
            interval: Duration::from_millis(100),
            enabled: true,
        },
    );

    tokio::time::sleep(Duration::from_millis(380)).await;
    handle.stop().await.unwrap();

    let hits = server.received_requests().await.unwrap().len();
    assert!(hits >= 2, "expected at least 2 polls, saw {}", hits);
}

#[tokio::test]
async fn disabled_poller_never_calls_the_provider() {
    let server = empty_page_server().await;
    let handle = NewsPoller::spawn(
        ingest_for(&server),
        PollerConfig {
            interval: Duration::from_millis(50),
            enabled: false,
        },
    );

    tokio::time::sleep(Duration::from_millis(250)).await;
    handle.stop().await.unwrap();

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn slow_cycles_are_not_reentrant() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "status": "ok",
                    "totalResults": 0,
                    "articles": []
                }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    // ticks fire every 50ms but each cycle takes ~300ms; the in-flight
    // guard must skip ticks instead of stacking cycles
    let handle = NewsPoller::spawn(
        ingest_for(&server),
        PollerConfig {
            interval: Duration::from_millis(50),
            enabled: true,
        },
    );

    tokio::time::sleep(Duration::from_millis(700)).await;
    handle.stop().await.unwrap();
    tokio::time::sleep(Duration::from_millis(350)).await;

    let hits = server.received_requests().await.unwrap().len();
    assert!(
        (1..=3).contains(&hits),
        "expected 1-3 serialized cycles, saw {}",
        hits
    );
}

#[tokio::test]
async fn stop_prevents_future_cycles() {
    let server = empty_page_server().await;
    let handle = NewsPoller::spawn(
        ingest_for(&server),
        PollerConfig {
            interval: Duration::from_millis(100),
            enabled: true,
        },
    );

    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.stop().await.unwrap();
    // let any in-flight cycle finish before counting
    tokio::time::sleep(Duration::from_millis(100)).await;
    let hits_at_stop = server.received_requests().await.unwrap().len();

    tokio::time::sleep(Duration::from_millis(300)).await;
    let hits_after = server.received_requests().await.unwrap().len();
    assert_eq!(hits_at_stop, hits_after);
}
