use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "rating_vault.json";

/// A configuration together with where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the configuration was read from; `None` when defaults are used
    pub source: Option<PathBuf>,
    /// SHA-256 of the source file content
    pub hash: Option<String>,
}

/// Candidate configuration files, in lookup order
///
/// An explicit path comes first, then `./rating_vault.json`,
/// `~/.config/rating-vault/config.json` and `~/.rating_vault.json`.
pub fn config_search_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = explicit {
        paths.push(path.to_path_buf());
    }
    paths.push(PathBuf::from(LOCAL_CONFIG_FILE));
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".config").join("rating-vault").join("config.json"));
        paths.push(home.join(".rating_vault.json"));
    }
    paths
}

/// Loads, parses and validates a single configuration file
///
/// # Arguments
///
/// * `path` - Path to the JSON configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Resolves the effective configuration
///
/// The first candidate that loads wins. A missing explicit path or a
/// malformed file is reported with a warning and the lookup moves on; when
/// nothing loads the defaults are used. This never fails.
pub fn load_config(explicit: Option<&Path>) -> LoadedConfig {
    for path in config_search_paths(explicit) {
        let is_explicit = explicit.is_some_and(|p| p == path);

        if !path.is_file() {
            if is_explicit {
                tracing::warn!("Config file {} not found, ignoring it", path.display());
            }
            continue;
        }

        match load_config_file(&path) {
            Ok(config) => {
                tracing::debug!("Loaded config from {}", path.display());
                let hash = compute_config_hash(&path).ok();
                return LoadedConfig {
                    config,
                    source: Some(path),
                    hash,
                };
            }
            Err(e) => {
                tracing::warn!("Ignoring config file {}: {}", path.display(), e);
            }
        }
    }

    tracing::debug!("No config file found, using defaults");
    LoadedConfig {
        config: Config::default(),
        source: None,
        hash: None,
    }
}

/// Writes a configuration as pretty-printed JSON, creating parent directories
pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content + "\n")?;
    Ok(())
}

/// Writes the default configuration to `path` and returns it
///
/// An existing file is left untouched and reported as a validation error.
pub fn create_default_config(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        return Err(ConfigError::Validation(format!(
            "{} already exists",
            path.display()
        )));
    }
    let config = Config::default();
    save_config(&config, path)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs with different settings can be told apart.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}
