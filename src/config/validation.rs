use crate::config::types::{Config, NetworkConfig};
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_base_url(&config.base_url)?;
    validate_data_dir(&config.data_dir)?;
    validate_max_pages(config.max_pages)?;
    validate_network_config(&config.network)?;
    Ok(())
}

/// Validates the site base URL: absolute http(s) with a host
fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", base_url, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' has no host",
            base_url
        )));
    }

    Ok(())
}

fn validate_data_dir(data_dir: &str) -> Result<(), ConfigError> {
    if data_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_max_pages(max_pages: Option<u32>) -> Result<(), ConfigError> {
    if max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 (use null for no limit)".to_string(),
        ));
    }
    Ok(())
}

/// Validates retry and pacing settings
fn validate_network_config(config: &NetworkConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    let durations = [
        ("timeout_secs", config.timeout_secs),
        ("connect_timeout_secs", config.connect_timeout_secs),
        ("rate_limit_cooldown_secs", config.rate_limit_cooldown_secs),
        (
            "rate_limit_cooldown_max_secs",
            config.rate_limit_cooldown_max_secs,
        ),
        ("backoff_step_secs", config.backoff_step_secs),
        ("page_delay_secs", config.page_delay_secs),
        ("detail_delay_secs", config.detail_delay_secs),
    ];
    for (name, value) in durations {
        // Rejects NaN, negatives and values too large for a Duration
        if Duration::try_from_secs_f64(value).is_err() {
            return Err(ConfigError::Validation(format!(
                "{} must be a non-negative number of seconds, got {}",
                name, value
            )));
        }
    }

    if config.timeout_secs <= 0.0 || config.connect_timeout_secs <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be > 0, got timeout_secs={} connect_timeout_secs={}",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    if config.rate_limit_cooldown_max_secs < config.rate_limit_cooldown_secs {
        return Err(ConfigError::Validation(format!(
            "rate_limit_cooldown_max_secs ({}) must be >= rate_limit_cooldown_secs ({})",
            config.rate_limit_cooldown_max_secs, config.rate_limit_cooldown_secs
        )));
    }

    Ok(())
}
