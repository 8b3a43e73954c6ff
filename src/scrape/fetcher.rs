//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building the shared HTTP client with a desktop-browser header set
//! - Retry logic for rate limiting (HTTP 429), timeouts and connect failures
//! - Error classification into typed failures with user guidance

use crate::config::{seconds, NetworkConfig};
use crate::{ConnectCause, FetchError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::{Client, StatusCode};
use std::error::Error as _;
use std::time::Duration;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:98.0) Gecko/20100101 Firefox/98.0";

/// Result of one logical fetch: the final response, whatever its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// HTTP status code
    pub status_code: u16,
    /// Response body
    pub body: String,
    /// Final URL after redirects
    pub final_url: String,
}

impl FetchResult {
    pub fn is_ok(&self) -> bool {
        self.status_code == StatusCode::OK.as_u16()
    }

    /// Canonical reason phrase of the status code, or "" when unknown
    pub fn reason(&self) -> &'static str {
        StatusCode::from_u16(self.status_code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("")
    }
}

/// Retry policy for one logical fetch
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts allowed, shared by 429, timeout and connect failures
    pub max_retries: u32,
    /// Per-attempt request timeout
    pub timeout: Duration,
    /// First wait after an HTTP 429
    pub rate_limit_cooldown: Duration,
    /// Upper bound for the doubling 429 wait
    pub rate_limit_cooldown_max: Duration,
    /// Linear backoff step for timeouts and connect failures
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout: Duration::from_secs(30),
            rate_limit_cooldown: Duration::from_secs(30),
            rate_limit_cooldown_max: Duration::from_secs(120),
            backoff_step: Duration::from_secs(5),
        }
    }
}

impl From<&NetworkConfig> for RetryPolicy {
    fn from(config: &NetworkConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            timeout: seconds(config.timeout_secs),
            rate_limit_cooldown: seconds(config.rate_limit_cooldown_secs),
            rate_limit_cooldown_max: seconds(config.rate_limit_cooldown_max_secs),
            backoff_step: seconds(config.backoff_step_secs),
        }
    }
}

/// Per-call retry bookkeeping; never shared between fetches
#[derive(Debug, Clone, PartialEq)]
pub struct RetryState {
    /// Zero-based index of the current attempt
    pub attempt: u32,
    /// Wait before retrying after the next 429
    pub cooldown: Duration,
}

impl RetryState {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempt: 0,
            cooldown: policy.rate_limit_cooldown,
        }
    }

    /// Doubles the 429 cooldown, capped at the policy ceiling
    pub fn escalate(&mut self, policy: &RetryPolicy) {
        self.cooldown = (self.cooldown * 2).min(policy.rate_limit_cooldown_max);
    }

    /// Wait before retrying a timeout or connect failure: `(attempt + 1) * step`
    pub fn linear_backoff(&self, policy: &RetryPolicy) -> Duration {
        policy.backoff_step * (self.attempt + 1)
    }
}

/// Builds the process-wide HTTP client
///
/// The header set mimics a desktop browser; compression is negotiated by the
/// client itself so bodies are decoded transparently.
pub fn build_http_client(config: &NetworkConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));

    Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .connect_timeout(seconds(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Classifies a connect failure from the text of its whole error chain
pub fn classify_connect_error(message: &str) -> ConnectCause {
    let message = message.to_lowercase();
    if message.contains("name or service not known")
        || message.contains("getaddrinfo failed")
        || message.contains("failed to lookup address")
        || message.contains("dns error")
        || message.contains("nodename nor servname")
    {
        ConnectCause::Dns
    } else if message.contains("connection refused") {
        ConnectCause::Refused
    } else {
        ConnectCause::Other
    }
}

/// Joins an error and all of its sources into one line
fn error_chain(error: &reqwest::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Outcome of a single attempt, before retry policy is applied
enum Attempt {
    Response(FetchResult),
    RateLimited,
}

/// The transport retry layer: one shared client plus a retry policy
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Builds the client from configuration and wraps it with its policy
    pub fn from_config(config: &NetworkConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?, RetryPolicy::from(config)))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches a URL with the fetcher's own retry budget and timeout
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        self.fetch_with(url, self.policy.max_retries, self.policy.timeout)
            .await
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 429 | Wait cooldown (doubling, capped), retry; exhausted → RateLimited |
    /// | Timeout | Wait `(attempt + 1) * step`, retry; exhausted → TimedOut |
    /// | Connect failure | Wait `(attempt + 1) * step`, retry; exhausted → ConnectionFailed |
    /// | Other transport error | Immediate → Network |
    /// | Any other status | Returned as-is |
    ///
    /// All conditions draw from the same attempt budget. At least one attempt
    /// is always made.
    pub async fn fetch_with(
        &self,
        url: &str,
        max_retries: u32,
        timeout: Duration,
    ) -> Result<FetchResult, FetchError> {
        let max_retries = max_retries.max(1);
        let mut state = RetryState::new(&self.policy);

        while state.attempt < max_retries {
            let is_last = state.attempt + 1 >= max_retries;

            match self.attempt(url, timeout).await {
                Ok(Attempt::Response(result)) => {
                    if state.attempt > 0 {
                        tracing::debug!("Fetched {} on attempt {}", url, state.attempt + 1);
                    }
                    return Ok(result);
                }

                Ok(Attempt::RateLimited) => {
                    if is_last {
                        break;
                    }
                    tracing::warn!(
                        "Rate limited (429). Waiting {:.0?} before retry ({}/{})...",
                        state.cooldown,
                        state.attempt + 1,
                        max_retries
                    );
                    tokio::time::sleep(state.cooldown).await;
                    state.escalate(&self.policy);
                }

                Err(error) if error.is_timeout() => {
                    if is_last {
                        return Err(FetchError::TimedOut {
                            url: url.to_string(),
                            attempts: state.attempt + 1,
                            source: error,
                        });
                    }
                    let wait = state.linear_backoff(&self.policy);
                    tracing::warn!(
                        "Request timed out. Retrying in {:.0?} ({}/{})...",
                        wait,
                        state.attempt + 1,
                        max_retries
                    );
                    tokio::time::sleep(wait).await;
                }

                Err(error) if error.is_connect() => {
                    if is_last {
                        return Err(FetchError::ConnectionFailed {
                            url: url.to_string(),
                            cause: classify_connect_error(&error_chain(&error)),
                            attempts: state.attempt + 1,
                            source: error,
                        });
                    }
                    let wait = state.linear_backoff(&self.policy);
                    tracing::warn!(
                        "Connection failed. Retrying in {:.0?} ({}/{})...",
                        wait,
                        state.attempt + 1,
                        max_retries
                    );
                    tokio::time::sleep(wait).await;
                }

                Err(error) => {
                    return Err(FetchError::Network {
                        url: url.to_string(),
                        source: error,
                    });
                }
            }

            state.attempt += 1;
        }

        Err(FetchError::RateLimited {
            url: url.to_string(),
            attempts: max_retries,
        })
    }

    async fn attempt(&self, url: &str, timeout: Duration) -> Result<Attempt, reqwest::Error> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(Attempt::RateLimited);
        }

        let final_url = response.url().to_string();
        let body = response.text().await?;

        Ok(Attempt::Response(FetchResult {
            status_code: status.as_u16(),
            body,
            final_url,
        }))
    }
}
