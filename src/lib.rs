//! Rating-Vault: a resilient backup tool for movie-rating histories
//!
//! This crate scrapes a user's rated movies and public lists from a paginated,
//! rate-limited catalog site and writes them out as CSV files, tolerating
//! transient network failures, HTTP 429 responses and partial HTML.

pub mod backup;
pub mod config;
pub mod model;
pub mod output;
pub mod scrape;
pub mod session;

use thiserror::Error;

/// Main error type for Rating-Vault operations
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Page layout changed at {url}: {source}")]
    Structural { url: String, source: ParseError },

    #[error("User ID '{user_id}' not found (URL: {url})")]
    UserNotFound { user_id: String, url: String },

    #[error("Invalid user ID '{user_id}': expected digits only")]
    InvalidUserId { user_id: String },

    #[error("Export error: {0}")]
    Export(#[from] output::ExportError),

    #[error("Session error: {0}")]
    Session(#[from] session::SessionError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VaultError {
    /// Multi-line, user-facing advice for the failure, when there is any
    pub fn guidance(&self) -> Option<String> {
        match self {
            Self::Fetch(e) => Some(e.guidance()),
            Self::Structural { .. } => Some(
                "The site layout no longer matches what the scraper expects.\n  \
                 This is not a network problem; retrying will not help."
                    .to_string(),
            ),
            Self::UserNotFound { .. } | Self::InvalidUserId { .. } => Some(
                "Check the user ID: it is the `user_id` parameter of your ratings page URL."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

/// Why a connection attempt failed, derived from the error chain text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectCause {
    /// The host name could not be resolved
    Dns,
    /// The server actively refused the connection
    Refused,
    /// Anything else (unreachable network, TLS failure, reset, ...)
    Other,
}

/// Transport-level failures, surfaced once the retry policy is exhausted
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Unable to connect to {url} ({cause:?}) after {attempts} attempt(s)")]
    ConnectionFailed {
        url: String,
        cause: ConnectCause,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} timed out after {attempts} attempt(s)")]
    TimedOut {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("Rate limited (HTTP 429) on {url} after {attempts} attempt(s)")]
    RateLimited { url: String, attempts: u32 },

    #[error("Network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response from {url}: HTTP {status} {reason}")]
    UnexpectedStatus {
        url: String,
        status: u16,
        reason: String,
    },
}

impl FetchError {
    /// The URL the failing request was addressed to
    pub fn url(&self) -> &str {
        match self {
            Self::ConnectionFailed { url, .. }
            | Self::TimedOut { url, .. }
            | Self::RateLimited { url, .. }
            | Self::Network { url, .. }
            | Self::UnexpectedStatus { url, .. } => url,
        }
    }

    /// Whether the failure belongs to the transient family the fetcher retries
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::TimedOut { .. } | Self::RateLimited { .. }
        )
    }

    /// Human-readable explanation with likely causes
    pub fn guidance(&self) -> String {
        match self {
            Self::ConnectionFailed {
                url,
                cause: ConnectCause::Dns,
                ..
            } => format!(
                "DNS resolution failed.\n  Possible causes:\n    \
                 - No internet connection\n    \
                 - DNS server is unreachable\n    \
                 - The site's domain is blocked\n  URL: {url}"
            ),
            Self::ConnectionFailed {
                url,
                cause: ConnectCause::Refused,
                ..
            } => format!(
                "Connection refused by the server.\n  Possible causes:\n    \
                 - The site is down or under maintenance\n    \
                 - Your IP may be blocked\n    \
                 - A firewall is blocking the connection\n  URL: {url}"
            ),
            Self::ConnectionFailed { url, source, .. } => format!(
                "Unable to connect to the site.\n  Possible causes:\n    \
                 - No internet connection\n    \
                 - The site is temporarily unavailable\n    \
                 - A network firewall is blocking access\n  URL: {url}\n  Details: {source}"
            ),
            Self::TimedOut { url, .. } => format!(
                "Request timed out.\n  Possible causes:\n    \
                 - Slow or unstable internet connection\n    \
                 - The server is overloaded\n  \
                 Try again in a few minutes.\n  URL: {url}"
            ),
            Self::RateLimited { url, attempts } => format!(
                "Rate limited after {attempts} attempt(s).\n  \
                 The site is throttling requests from your IP.\n  \
                 Please wait 10-15 minutes before trying again.\n  URL: {url}"
            ),
            Self::Network { url, source } => {
                format!("Network error.\n  URL: {url}\n  Error: {source}")
            }
            Self::UnexpectedStatus {
                url,
                status,
                reason,
            } => format!(
                "Unexpected response (HTTP {status}).\n  \
                 The server returned an unexpected status code.\n  \
                 URL: {url}\n  Status: {status} {reason}"
            ),
        }
    }
}

/// Structural HTML failures: an anchor the extractor cannot do without is gone
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing listing container '{selector}'")]
    MissingContainer { selector: &'static str },

    #[error("item {item} is missing mandatory field '{field}'")]
    MissingField { item: String, field: &'static str },

    #[error("selector '{selector}' does not parse")]
    InvalidSelector { selector: &'static str },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Rating-Vault operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{ColumnBuffers, ListReference, MovieCard};
pub use scrape::{FetchResult, Fetcher, Language, SortOrder};
