use std::time::Instant;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pulse_news::{NewsApiClient, NewsApiConfig};

fn client_for(server: &MockServer) -> NewsApiClient {
    NewsApiClient::new(NewsApiConfig {
        base_url: format!("{}/v2/top-headlines", server.uri()),
        api_key: Some("test-key".to_string()),
        page_size: 20,
        max_retries: 3,
    })
}

fn sample_page() -> serde_json::Value {
    json!({
        "status": "ok",
        "totalResults": 3,
        "articles": [
            {
                "source": {"id": null, "name": "Reuters"},
                "title": "Markets rally on upbeat data",
                "description": "Stocks climbed.",
                "url": "https://reuters.com/markets-rally",
                "urlToImage": "https://reuters.com/rally.jpg",
                "publishedAt": "2026-01-05T10:30:00Z",
                "content": "Stocks climbed across the board."
            },
            {
                "source": {"id": null, "name": "AP"},
                "title": "Storm batters coast",
                "description": "Heavy rain.",
                "url": "https://apnews.com/storm",
                "urlToImage": null,
                "publishedAt": "not-a-timestamp",
                "content": "Heavy rain and wind."
            },
            {
                "source": {"id": null, "name": "BBC"},
                "title": null,
                "description": "No title on this one.",
                "url": "https://bbc.com/untitled",
                "publishedAt": "2026-01-05T09:00:00Z",
                "content": "Body."
            }
        ]
    })
}

#[tokio::test]
async fn fetch_page_maps_records_and_tolerates_bad_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .and(query_param("pageSize", "20"))
        .and(header("X-Api-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_page()))
        .mount(&server)
        .await;

    let articles = client_for(&server).fetch_page().await;

    // the untitled record is dropped, the malformed date is tolerated
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].title.as_deref(), Some("Markets rally on upbeat data"));
    assert_eq!(
        articles[0].image_url.as_deref(),
        Some("https://reuters.com/rally.jpg")
    );
    assert!(articles[0].published_at.is_some());
    assert_eq!(articles[1].title.as_deref(), Some("Storm batters coast"));
    assert!(articles[1].published_at.is_none());
}

#[tokio::test]
async fn fetch_page_waits_for_retry_after_hint_then_succeeds() {
    let server = MockServer::start().await;

    // first attempt is rate limited with a 2s hint, second succeeds
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_page()))
        .mount(&server)
        .await;

    let start = Instant::now();
    let articles = client_for(&server).fetch_page().await;
    let elapsed = start.elapsed();

    assert_eq!(articles.len(), 2);
    // the hint (2s) exceeds the attempt-1 exponential wait (1s)
    assert!(
        elapsed.as_millis() >= 2_000,
        "expected a >=2s wait before the retry, waited {:?}",
        elapsed
    );
}

#[tokio::test]
async fn fetch_page_does_not_retry_client_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .expect(1)
        .mount(&server)
        .await;

    let start = Instant::now();
    let articles = client_for(&server).fetch_page().await;

    assert!(articles.is_empty());
    // no backoff sleep on the non-retryable path
    assert!(start.elapsed().as_millis() < 500);
}

#[tokio::test]
async fn fetch_page_retries_server_errors_until_the_cap() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let articles = client_for(&server).fetch_page().await;
    assert!(articles.is_empty());
}

#[tokio::test]
async fn fetch_page_short_circuits_without_api_key() {
    // no server: a missing key must not trigger any network call
    let client = NewsApiClient::new(NewsApiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        api_key: None,
        page_size: 20,
        max_retries: 3,
    });

    let articles = client.fetch_page().await;
    assert!(articles.is_empty());

    let client = NewsApiClient::new(NewsApiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        api_key: Some("   ".to_string()),
        page_size: 20,
        max_retries: 3,
    });
    assert!(client.fetch_page().await.is_empty());
}
