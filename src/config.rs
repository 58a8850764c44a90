//! Codec configuration.
//!
//! Limits and advertised settings for one server endpoint, loadable from TOML.
//! Every field has a default, so an empty document is a valid configuration.

use std::path::Path;

use serde::Deserialize;

use crate::h2_codec::MAX_HEADER_BLOCK_SIZE;
use crate::settings::{Http2Settings, MAX_MAX_FRAME_SIZE, MAX_WINDOW_SIZE, MIN_MAX_FRAME_SIZE};

/// Default maximum URL length: 8 KiB minus the request-line overhead.
pub const DEFAULT_MAX_URI_LENGTH: usize = 8192 - 17;

/// Errors loading or validating a [`CodecConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Codec configuration loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecConfig {
    /// SETTINGS_HEADER_TABLE_SIZE we advertise; bounds the peer's table size updates.
    #[serde(default = "default_header_table_size")]
    pub header_table_size: u32,

    /// SETTINGS_MAX_CONCURRENT_STREAMS we advertise.
    #[serde(default = "default_max_concurrent_streams")]
    pub max_concurrent_streams: u32,

    /// SETTINGS_INITIAL_WINDOW_SIZE we advertise.
    #[serde(default = "default_initial_window_size")]
    pub initial_window_size: u32,

    /// SETTINGS_MAX_FRAME_SIZE we advertise; larger incoming frames are rejected.
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: u32,

    /// SETTINGS_MAX_HEADER_LIST_SIZE we advertise; larger header lists get 431.
    #[serde(default = "default_max_header_list_size")]
    pub max_header_list_size: u32,

    /// Longest accepted `:path`; longer requests get 414.
    #[serde(default = "default_max_uri_length")]
    pub max_uri_length: usize,

    /// Largest encoded header block accepted across CONTINUATION frames.
    #[serde(default = "default_max_header_block_size")]
    pub max_header_block_size: usize,

    /// Huffman-code outgoing string literals when it saves space.
    #[serde(default)]
    pub huffman_encode: bool,

    /// How long writers wait for flow-control credit, in milliseconds.
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,
}

fn default_header_table_size() -> u32 {
    4096
}

fn default_max_concurrent_streams() -> u32 {
    100
}

fn default_initial_window_size() -> u32 {
    65_535
}

fn default_max_frame_size() -> u32 {
    MIN_MAX_FRAME_SIZE
}

fn default_max_header_list_size() -> u32 {
    8192
}

fn default_max_uri_length() -> usize {
    DEFAULT_MAX_URI_LENGTH
}

fn default_max_header_block_size() -> usize {
    MAX_HEADER_BLOCK_SIZE
}

fn default_write_timeout_ms() -> u64 {
    30_000
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            header_table_size: default_header_table_size(),
            max_concurrent_streams: default_max_concurrent_streams(),
            initial_window_size: default_initial_window_size(),
            max_frame_size: default_max_frame_size(),
            max_header_list_size: default_max_header_list_size(),
            max_uri_length: default_max_uri_length(),
            max_header_block_size: default_max_header_block_size(),
            huffman_encode: false,
            write_timeout_ms: default_write_timeout_ms(),
        }
    }
}

impl CodecConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: CodecConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_MAX_FRAME_SIZE..=MAX_MAX_FRAME_SIZE).contains(&self.max_frame_size) {
            return Err(ConfigError::Invalid(format!(
                "max_frame_size ({}) must be between {} and {}",
                self.max_frame_size, MIN_MAX_FRAME_SIZE, MAX_MAX_FRAME_SIZE
            )));
        }

        if self.initial_window_size > MAX_WINDOW_SIZE {
            return Err(ConfigError::Invalid(format!(
                "initial_window_size ({}) must be at most {}",
                self.initial_window_size, MAX_WINDOW_SIZE
            )));
        }

        if self.max_header_block_size == 0 {
            return Err(ConfigError::Invalid(
                "max_header_block_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// The settings announced in our initial SETTINGS frame.
    pub fn server_settings(&self) -> Http2Settings {
        Http2Settings {
            header_table_size: self.header_table_size,
            enable_push: false,
            max_concurrent_streams: self.max_concurrent_streams,
            initial_window_size: self.initial_window_size,
            max_frame_size: self.max_frame_size,
            max_header_list_size: self.max_header_list_size,
        }
    }

    pub fn write_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.write_timeout_ms)
    }
}
