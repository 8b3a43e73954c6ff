//! Transport retry layer against a mock server

use crate::fixtures::fast_policy;
use rating_vault::config::NetworkConfig;
use rating_vault::scrape::{build_http_client, Fetcher};
use rating_vault::{ConnectCause, FetchError};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(max_retries: u32, timeout: Duration) -> Fetcher {
    let client = build_http_client(&NetworkConfig::default()).expect("client builds");
    Fetcher::new(client, fast_policy(max_retries, timeout))
}

#[tokio::test]
async fn test_succeeds_after_rate_limiting() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("finally"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = fetcher(3, Duration::from_secs(5))
        .fetch(&format!("{}/page", mock_server.uri()))
        .await
        .expect("third attempt succeeds");

    assert_eq!(result.status_code, 200);
    assert_eq!(result.body, "finally");
    assert!(result.final_url.ends_with("/page"));
}

#[tokio::test]
async fn test_rate_limited_after_exhausting_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&mock_server)
        .await;

    let url = format!("{}/busy", mock_server.uri());
    let error = fetcher(3, Duration::from_secs(5))
        .fetch(&url)
        .await
        .expect_err("every attempt is rate limited");

    match &error {
        FetchError::RateLimited { url: failed, attempts } => {
            assert_eq!(failed, &url);
            assert_eq!(*attempts, 3);
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
    assert!(error.is_transient());
    assert!(error.guidance().contains("10-15 minutes"));
}

#[tokio::test]
async fn test_timeout_is_retried_then_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let error = fetcher(2, Duration::from_millis(100))
        .fetch(&format!("{}/slow", mock_server.uri()))
        .await
        .expect_err("every attempt times out");

    assert!(
        matches!(error, FetchError::TimedOut { attempts: 2, .. }),
        "got {error:?}"
    );
}

#[tokio::test]
async fn test_connection_refused() {
    // Nothing listens on port 1
    let error = fetcher(2, Duration::from_secs(2))
        .fetch("http://127.0.0.1:1/")
        .await
        .expect_err("connection is refused");

    match &error {
        FetchError::ConnectionFailed {
            cause, attempts, ..
        } => {
            assert_eq!(*cause, ConnectCause::Refused);
            assert_eq!(*attempts, 2);
        }
        other => panic!("expected ConnectionFailed, got {other:?}"),
    }
    assert!(error.guidance().starts_with("Connection refused"));
}

#[tokio::test]
async fn test_invalid_url_is_not_retried() {
    let error = fetcher(3, Duration::from_secs(1))
        .fetch("not a url")
        .await
        .expect_err("request cannot be built");

    assert!(matches!(error, FetchError::Network { .. }), "got {error:?}");
    assert!(!error.is_transient());
}

#[tokio::test]
async fn test_error_statuses_are_returned_as_is() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = fetcher(3, Duration::from_secs(5))
        .fetch(&format!("{}/broken", mock_server.uri()))
        .await
        .expect("500 is a response, not a failure");

    assert_eq!(result.status_code, 500);
    assert_eq!(result.reason(), "Internal Server Error");
    assert!(!result.is_ok());
}
