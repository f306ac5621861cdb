//! HTTP endpoint behavior, served from a real listener on an ephemeral
//! port and queried over the loopback interface.

use std::sync::Arc;

use refeed::cache::FeedCache;
use refeed::config::Config;
use refeed::server::{router, AppState};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const UPSTREAM_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>t</title><link>https://origin.example/</link><description>d</description>
    <item><guid>1</guid><title>Post</title><link>https://origin.example/1</link>
    <description>&lt;p&gt;Body text&lt;/p&gt;</description></item>
</channel></rss>"#;

/// Bind the service on an ephemeral port and return its base URL.
async fn spawn_app(upstream: &MockServer) -> String {
    let config = Arc::new(Config {
        source_feed_url: format!("{}/feed.xml", upstream.uri()),
        site_base: "https://origin.example/".to_string(),
        feed_title: "Normalized".to_string(),
        feed_link: "https://feeds.example/".to_string(),
        feed_description: "Normalized feed".to_string(),
        telegram_max: 4096,
        cache_ttl_secs: 600,
        port: 0,
    });
    let cache = Arc::new(FeedCache::new(Arc::clone(&config), reqwest::Client::new()));
    let state = AppState { cache, config };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener must bind");
    let addr = listener.local_addr().expect("listener has an address");
    tokio::spawn(async move {
        axum::serve(listener, router(state))
            .await
            .expect("server should run");
    });
    format!("http://{addr}")
}

async fn fetch_json(client: &reqwest::Client, url: &str) -> serde_json::Value {
    let text = client
        .get(url)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    serde_json::from_str(&text).unwrap()
}

#[tokio::test]
async fn test_health_reports_cold_start_then_updates() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(UPSTREAM_RSS))
        .mount(&upstream)
        .await;

    let base = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let body = fetch_json(&client, &format!("{base}/health")).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["updated"], 0);
    assert!(body["source"].as_str().unwrap().ends_with("/feed.xml"));

    // A feed request populates the cache; health reflects it afterwards.
    client
        .get(format!("{base}/zen.xml"))
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap();
    let body = fetch_json(&client, &format!("{base}/health")).await;
    assert!(body["updated"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_feed_endpoints_serve_rss_content_type() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(UPSTREAM_RSS))
        .mount(&upstream)
        .await;

    let base = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    for (path, marker) in [
        ("/zen.xml", "xmlns:yandex"),
        ("/telegram.xml", "— Telegram"),
    ] {
        let response = client.get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(response.status(), 200, "{path}");
        assert_eq!(
            response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("application/rss+xml; charset=utf-8"),
            "{path}"
        );
        let body = response.text().await.unwrap();
        assert!(body.starts_with("<?xml"), "{path}");
        assert!(body.contains(marker), "{path}");
    }
}

#[tokio::test]
async fn test_both_endpoints_share_one_upstream_fetch() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(UPSTREAM_RSS))
        .expect(1)
        .mount(&upstream)
        .await;

    let base = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    for path in ["/zen.xml", "/telegram.xml", "/zen.xml"] {
        client
            .get(format!("{base}{path}"))
            .send()
            .await
            .unwrap()
            .error_for_status()
            .unwrap();
    }
}

#[tokio::test]
async fn test_unavailable_upstream_yields_500_with_cause() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&upstream)
        .await;

    let base = spawn_app(&upstream).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base}/zen.xml"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body = response.text().await.unwrap();
    assert!(body.contains("Feed generation failed"));

    // Health still answers while the upstream is down.
    let health = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), 200);
}
