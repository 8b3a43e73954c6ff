//! Configuration module for Rating-Vault
//!
//! This module handles locating, loading, validating and saving the JSON
//! configuration file.
//!
//! # Example
//!
//! ```no_run
//! use rating_vault::config::load_config;
//!
//! let loaded = load_config(None);
//! println!("Backups go to: {}", loaded.config.data_dir);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, NetworkConfig};
pub(crate) use types::seconds;

// Re-export parser functions
pub use parser::{
    compute_config_hash, config_search_paths, create_default_config, load_config,
    load_config_file, save_config, LoadedConfig, LOCAL_CONFIG_FILE,
};
