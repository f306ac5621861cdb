//! Upstream HTTP fetch for the source feed.

use std::time::Duration;
use thiserror::Error;

/// A slow origin must fail the refresh, not hang every waiting request.
const FETCH_TIMEOUT: Duration = Duration::from_secs(20);
/// Upper bound on the response body; a feed larger than this is broken.
const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors from fetching the upstream feed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the fetch timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the size limit
    #[error("Response too large")]
    ResponseTooLarge,
}

/// Fetch the source feed bytes.
///
/// The client carries the service user-agent; this adds the timeout, the
/// status check and the size bound. Any non-2xx status is an error, so the
/// caller never sees an error page as feed bytes.
pub async fn fetch_feed(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    fetch_with_timeout(client, url, FETCH_TIMEOUT).await
}

async fn fetch_with_timeout(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, FetchError> {
    let response = tokio::time::timeout(timeout, client.get(url).send())
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(FetchError::Network)?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    if let Some(length) = response.content_length() {
        if length as usize > MAX_FEED_SIZE {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let bytes = tokio::time::timeout(timeout, response.bytes())
        .await
        .map_err(|_| FetchError::Timeout)??;
    if bytes.len() > MAX_FEED_SIZE {
        return Err(FetchError::ResponseTooLarge);
    }

    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <item><guid>1</guid><title>Test</title></item>
</channel></rss>"#;

    #[tokio::test]
    async fn test_fetch_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .insert_header("Content-Type", "application/xml"),
            )
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let bytes = fetch_feed(&client, &format!("{}/feed.xml", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(bytes, VALID_RSS.as_bytes());
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("User-Agent", "refeed-test/0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RSS))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::builder()
            .user_agent("refeed-test/0")
            .build()
            .unwrap();
        let result = fetch_feed(&client, &format!("{}/feed.xml", mock_server.uri())).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let result = fetch_feed(&client, &format!("{}/feed.xml", mock_server.uri())).await;
        match result.unwrap_err() {
            FetchError::HttpStatus(404) => {}
            e => panic!("Expected HttpStatus(404), got {:?}", e),
        }
    }

    #[tokio::test]
    async fn test_slow_origin_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let result = fetch_with_timeout(
            &client,
            &format!("{}/feed.xml", mock_server.uri()),
            Duration::from_millis(50),
        )
        .await;
        assert!(matches!(result, Err(FetchError::Timeout)));
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; MAX_FEED_SIZE + 1]))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let result = fetch_feed(&client, &format!("{}/feed.xml", mock_server.uri())).await;
        assert!(matches!(result, Err(FetchError::ResponseTooLarge)));
    }
}
