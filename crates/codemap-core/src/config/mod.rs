//! Configuration management for codemap.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `codemap.toml` file
//! 3. User config `~/.config/codemap/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Parser selection and limits.
    pub parser: ParserConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./codemap.toml` (project local)
    /// 2. `~/.config/codemap/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_file(DEFAULT_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(DEFAULT_CONFIG_DIR).join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;

        config.apply_env_overrides();

        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.parser.max_file_size == 0 {
            return Err(ConfigError::Invalid(
                "parser.max_file_size must be greater than zero".to_string(),
            ));
        }
        for (ext, lang) in &self.parser.extension_aliases {
            if ext.trim().is_empty() || lang.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "empty extension alias entry: '{}' = '{}'",
                    ext, lang
                )));
            }
        }
        Ok(())
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(size) = std::env::var("CODEMAP_MAX_FILE_SIZE") {
            if let Ok(n) = size.parse::<u64>() {
                if n > 0 {
                    self.parser.max_file_size = n;
                }
            }
        }
        if let Ok(flag) = std::env::var("CODEMAP_GRAMMAR_TIER") {
            match flag.to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => self.parser.grammar_tier = true,
                "0" | "false" | "off" | "no" => self.parser.grammar_tier = false,
                _ => {}
            }
        }
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum file size (in bytes) that gets structural parsing.
    pub max_file_size: u64,

    /// Use the tree-sitter tier for TypeScript/JavaScript.
    pub grammar_tier: bool,

    /// Extra extensions bound to an already registered language
    /// (e.g. `jav = "java"`).
    pub extension_aliases: BTreeMap<String, String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            grammar_tier: DEFAULT_GRAMMAR_TIER,
            extension_aliases: BTreeMap::new(),
        }
    }
}
