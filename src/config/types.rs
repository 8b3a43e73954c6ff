use crate::scrape::{Language, SortOrder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Main configuration structure for Rating-Vault
///
/// Every key is optional in the file; missing keys take the documented
/// defaults. Unknown keys are kept in `extra` so saving a loaded config does
/// not drop them, but they are otherwise ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scheme and host of the catalog site
    pub base_url: String,

    /// Listing language
    pub lang: Language,

    /// Directory holding one sub-directory of CSV files per user
    pub data_dir: String,

    /// Sort order requested for named lists
    pub order_by: SortOrder,

    /// Look up original titles (Spanish listings only)
    pub fetch_original_titles: bool,

    /// Inclusive page ceiling for every listing; `null` means all pages
    pub max_pages: Option<u32>,

    /// Also write a Letterboxd import file for the watched movies
    pub letterboxd_export: bool,

    /// Transport and pacing settings
    pub network: NetworkConfig,

    /// Unrecognized keys, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://www.filmaffinity.com".to_string(),
            lang: Language::En,
            data_dir: "data".to_string(),
            order_by: SortOrder::Rating,
            fetch_original_titles: true,
            max_pages: None,
            letterboxd_export: false,
            network: NetworkConfig::default(),
            extra: Map::new(),
        }
    }
}

/// Transport retry and pacing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Attempts per logical request (429, timeouts and connect failures share it)
    pub max_retries: u32,

    /// Per-attempt request timeout (seconds)
    pub timeout_secs: f64,

    /// TCP connect timeout (seconds)
    pub connect_timeout_secs: f64,

    /// First wait after an HTTP 429 (seconds)
    pub rate_limit_cooldown_secs: f64,

    /// Ceiling of the doubling 429 wait (seconds)
    pub rate_limit_cooldown_max_secs: f64,

    /// Linear backoff step for timeouts and connect failures (seconds)
    pub backoff_step_secs: f64,

    /// Pause between listing pages (seconds)
    pub page_delay_secs: f64,

    /// Pause after each original-title lookup (seconds)
    pub detail_delay_secs: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout_secs: 30.0,
            connect_timeout_secs: 10.0,
            rate_limit_cooldown_secs: 30.0,
            rate_limit_cooldown_max_secs: 120.0,
            backoff_step_secs: 5.0,
            page_delay_secs: 5.0,
            detail_delay_secs: 0.5,
        }
    }
}

/// Converts a seconds setting to a `Duration`
///
/// Validated configs always convert exactly. Values that slipped past
/// validation saturate instead of panicking: NaN and negatives become zero.
pub(crate) fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(if value > 0.0 {
        Duration::MAX
    } else {
        Duration::ZERO
    })
}
