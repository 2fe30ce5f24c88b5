//! Configuration for survey exports
//!
//! The configuration is usually embedded in the caller's own settings file;
//! it can be loaded from TOML or JSON, or assembled with
//! [`ExportConfig::builder`].

use serde::{Deserialize, Serialize};

/// Default separator between a question key and its option/slot key
pub const DEFAULT_OPTION_SEPARATOR: &str = "-";

/// Error while loading or validating a configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Which per-question metadata columns to export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncludeMeta {
    /// `metaInit`: times the question was rendered
    pub init_times: bool,
    /// `metaDisplayed`: times the question became visible
    pub displayed_times: bool,
    /// `metaResponse`: times the answer changed
    pub responsed_times: bool,
    /// `metaPosition`: position in the rendered survey
    pub position: bool,
}

impl IncludeMeta {
    /// All metadata columns enabled
    pub fn all() -> Self {
        Self {
            init_times: true,
            displayed_times: true,
            responsed_times: true,
            position: true,
        }
    }

    pub fn any(&self) -> bool {
        self.init_times || self.displayed_times || self.responsed_times || self.position
    }
}

/// Configuration for one export run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    /// Joins question keys with option or slot keys in column names
    pub question_option_separator: String,

    /// Strip the survey key prefix from question keys (codebook export)
    pub short_keys: bool,

    /// Root key of the survey, e.g. `weekly`
    pub survey_key: String,

    /// Metadata columns to include
    pub include_meta: IncludeMeta,

    /// Output format (`csv` or `json`)
    pub format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            question_option_separator: DEFAULT_OPTION_SEPARATOR.to_string(),
            short_keys: false,
            survey_key: String::new(),
            include_meta: IncludeMeta::default(),
            format: "csv".to_string(),
        }
    }
}

impl ExportConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::default()
    }

    /// Load and validate a configuration from TOML
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ExportConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from JSON
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: ExportConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check option combinations that cannot produce a usable export
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.question_option_separator.is_empty() {
            return Err(ConfigError::Invalid(
                "questionOptionSeparator must not be empty".to_string(),
            ));
        }
        if self.short_keys && self.survey_key.is_empty() {
            return Err(ConfigError::Invalid(
                "shortKeys requires surveyKey to be set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for ExportConfig
#[derive(Debug, Default)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn question_option_separator(mut self, separator: impl Into<String>) -> Self {
        self.config.question_option_separator = separator.into();
        self
    }

    pub fn short_keys(mut self, short_keys: bool) -> Self {
        self.config.short_keys = short_keys;
        self
    }

    pub fn survey_key(mut self, survey_key: impl Into<String>) -> Self {
        self.config.survey_key = survey_key.into();
        self
    }

    pub fn include_meta(mut self, include_meta: IncludeMeta) -> Self {
        self.config.include_meta = include_meta;
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.config.format = format.into();
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ExportConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
