//! Configuration module for Gongmo
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a file is supported.
//!
//! # Example
//!
//! ```no_run
//! use gongmo::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("gongmo.toml")).unwrap();
//! println!("Pages are fetched at most every {}ms", config.pacing.min_interval_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FetchConfig, ListingConfig, OutputConfig, PacingConfig, SourcesConfig,
    DEFAULT_ACCEPT, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, hash_config_content, load_config, load_config_with_hash, parse_config,
};
