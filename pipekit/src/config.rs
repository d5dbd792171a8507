//! Configuration types for validation and logging.

use serde::{Deserialize, Serialize};

/// Options that tune how the result validator inspects a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Seek each part stream to the start before and after a stream check.
    #[serde(default = "default_rewind_streams")]
    pub rewind_streams: bool,
    /// Fail when a part named by a configured check is missing from the message.
    #[serde(default)]
    pub require_configured_parts: bool,
    /// Maximum number of characters of stream text quoted in failure messages.
    #[serde(default = "default_max_preview_chars")]
    pub max_preview_chars: usize,
}

const fn default_rewind_streams() -> bool {
    true
}

const fn default_max_preview_chars() -> usize {
    256
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            rewind_streams: default_rewind_streams(),
            require_configured_parts: false,
            max_preview_chars: default_max_preview_chars(),
        }
    }
}

impl ValidatorConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether streams are rewound around stream checks.
    #[must_use]
    pub const fn with_rewind_streams(mut self, rewind: bool) -> Self {
        self.rewind_streams = rewind;
        self
    }

    /// Sets whether configured parts must exist in the message.
    #[must_use]
    pub const fn with_require_configured_parts(mut self, require: bool) -> Self {
        self.require_configured_parts = require;
        self
    }

    /// Sets the preview length for stream text in failure messages.
    #[must_use]
    pub const fn with_max_preview_chars(mut self, chars: usize) -> Self {
        self.max_preview_chars = chars;
        self
    }

    /// Parses a configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a serde error if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Truncates `text` to the preview length.
    #[must_use]
    pub fn preview(&self, text: &str) -> String {
        if text.chars().count() <= self.max_preview_chars {
            return text.to_string();
        }
        let mut truncated: String = text.chars().take(self.max_preview_chars).collect();
        truncated.push_str("...");
        truncated
    }
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// JSON lines.
    Json,
}

/// Logging configuration used by [`crate::observability::init_tracing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Creates a new logging configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter directive.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Sets the output format.
    #[must_use]
    pub const fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_config_defaults() {
        let config = ValidatorConfig::default();
        assert!(config.rewind_streams);
        assert!(!config.require_configured_parts);
        assert_eq!(config.max_preview_chars, 256);
    }

    #[test]
    fn test_validator_config_from_partial_json() {
        let config = ValidatorConfig::from_json_str(r#"{"require_configured_parts": true}"#).unwrap();
        assert!(config.require_configured_parts);
        assert!(config.rewind_streams);
        assert_eq!(config.max_preview_chars, 256);
    }

    #[test]
    fn test_preview_truncates() {
        let config = ValidatorConfig::new().with_max_preview_chars(4);
        assert_eq!(config.preview("abc"), "abc");
        assert_eq!(config.preview("abcdef"), "abcd...");
    }

    #[test]
    fn test_logging_config_serde() {
        let config: LoggingConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "info");
    }
}
