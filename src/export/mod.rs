//! Export functionality
//!
//! Provides the exporters of the SDK:
//! - Responses (CSV or JSON rows, one per submitted response)
//! - Survey info (codebook of the schema itself, one row per option)
//!
//! and the [`ExportJob`] that drives a full response export.

pub mod job;
pub mod render;
pub mod responses;
pub mod survey_info;

use std::str::FromStr;

use crate::config::ConfigError;
use crate::resolver::ResolveError;

/// Error during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error(transparent)]
    VersionNotFound(#[from] ResolveError),
    #[error("Invalid exporter state: {0}")]
    InvalidState(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExportError {
    /// Whether the error concerns a single response only.
    ///
    /// Recoverable errors skip the affected response; everything else aborts
    /// the export run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ExportError::VersionNotFound(_))
    }
}

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

// Re-export for convenience
pub use job::{ExportJob, ExportProgress, ExportSummary};
pub use render::render_value;
pub use responses::{ParsedResponse, ResponseExporter, ResponseParser};
pub use survey_info::{SurveyInfoExporter, SurveyInfoRow};
