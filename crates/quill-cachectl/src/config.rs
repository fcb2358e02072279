//! # CLI Configuration
//!
//! Environment-based configuration for the cache control tool.

use std::env;
use std::str::FromStr;

use quill_cache::CacheSettings;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Tool configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote cache configuration
    pub cache: CacheSettings,

    /// Logging level, used when `RUST_LOG` is unset
    pub log_level: String,

    /// Logging format
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            cache: CacheSettings::from_env(),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            log_format: env::var("LOG_FORMAT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
