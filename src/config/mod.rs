// Configuration management
use crate::error::{Result, SpeculateError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub defaults: IssueDefaults,
    #[serde(default)]
    pub console: ConsoleConfig,
}

/// Defaults applied to every issuance before command-line flags
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct IssueDefaults {
    /// Session lifetime in seconds (900-3600)
    pub lifetime: Option<i64>,
    #[serde(default)]
    pub mfa: bool,
    pub mfa_serial: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Open the browser instead of printing the URL
    #[serde(default)]
    pub open: bool,
    /// Console path to land on, e.g. "ec2/home"
    pub path: Option<String>,
}

impl Config {
    /// Get the config directory path
    ///
    /// Priority:
    /// 1. XDG_CONFIG_HOME/speculate (if env var is set)
    /// 2. ~/.config/speculate (if ~/.config exists)
    /// 3. ~/.speculate (fallback on Unix)
    /// 4. Platform default on Windows
    pub fn config_dir() -> Result<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return Ok(PathBuf::from(xdg_config).join("speculate"));
        }

        #[cfg(unix)]
        {
            if let Some(home_dir) = dirs::home_dir() {
                let xdg_config = home_dir.join(".config");
                if xdg_config.exists() {
                    return Ok(xdg_config.join("speculate"));
                }
                return Ok(home_dir.join(".speculate"));
            }
        }

        #[cfg(not(unix))]
        {
            if let Some(config_dir) = dirs::config_dir() {
                return Ok(config_dir.join("speculate"));
            }
        }

        Err(SpeculateError::ConfigError(
            "Could not determine config directory".to_string(),
        ))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, environment variables, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_file_path()?)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Load a config file, falling back to defaults when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Config file not found at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        tracing::debug!("Loading config from: {}", path.display());
        let contents = fs::read_to_string(path)
            .map_err(|e| SpeculateError::ConfigError(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&contents)
            .map_err(|e| SpeculateError::ConfigError(format!("Failed to parse config file: {}", e)))
    }

    /// Override values from `SPECULATE_LIFETIME` and `SPECULATE_MFA_SERIAL`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(lifetime) = lookup("SPECULATE_LIFETIME") {
            tracing::debug!("Using SPECULATE_LIFETIME from environment: {}", lifetime);
            let seconds = lifetime.trim().parse::<i64>().map_err(|e| {
                SpeculateError::ConfigError(format!("Invalid SPECULATE_LIFETIME '{}': {}", lifetime, e))
            })?;
            self.defaults.lifetime = Some(seconds);
        }

        if let Some(serial) = lookup("SPECULATE_MFA_SERIAL") {
            tracing::debug!("Using SPECULATE_MFA_SERIAL from environment: {}", serial);
            self.defaults.mfa_serial = Some(serial);
        }

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SpeculateError::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Create a sample config file with comments
    pub fn create_sample() -> Result<PathBuf> {
        let config_path = Self::config_file_path()?;
        Self::write_sample(&config_path)?;
        Ok(config_path)
    }

    fn write_sample(config_path: &Path) -> Result<()> {
        if let Some(config_dir) = config_path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir).map_err(|e| {
                    SpeculateError::ConfigError(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        // Don't overwrite existing config
        if config_path.exists() {
            return Err(SpeculateError::ConfigError(format!(
                "Config file already exists at: {}",
                config_path.display()
            )));
        }

        fs::write(config_path, SAMPLE_CONFIG)
            .map_err(|e| SpeculateError::ConfigError(format!("Failed to write sample config: {}", e)))?;

        tracing::info!("Created sample config at: {}", config_path.display());
        Ok(())
    }
}

const SAMPLE_CONFIG: &str = r#"# speculate configuration
# Location priority:
#   1. $XDG_CONFIG_HOME/speculate/config.toml (if XDG_CONFIG_HOME is set)
#   2. ~/.config/speculate/config.toml (if ~/.config exists)
#   3. ~/.speculate/config.toml (fallback)
#
# Environment overrides:
#   SPECULATE_LIFETIME
#   SPECULATE_MFA_SERIAL
#
# Command-line flags take precedence over everything here.

[defaults]
# Session lifetime in seconds, between 900 and 3600 (default: 3600)
# lifetime = 3600

# Always send MFA with requests. Like lifetime above, this also makes
# `speculate console` issue new credentials instead of reusing the
# environment's as-is.
mfa = false

# MFA device ARN; defaults to the virtual device of the calling IAM user
# mfa_serial = "arn:aws:iam::123456789012:mfa/alice"

[console]
# Open the console in the default browser instead of printing the URL
open = false

# Console path to land on
# path = "ec2/home"
"#;
