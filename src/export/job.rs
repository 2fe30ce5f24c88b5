//! Export job
//!
//! Drives one complete response export: builds the column schema, streams
//! every response through the parser into the exporter, and reports progress.

use std::io::Write;

use serde::Serialize;
use tracing::{info, info_span, warn};
use uuid::Uuid;

use super::responses::{ResponseExporter, ResponseParser};
use super::{ExportError, ExportFormat};
use crate::columns::ColumnSchemaBuilder;
use crate::config::ExportConfig;
use crate::handlers::HandlerRegistry;
use crate::models::{SurveyResponse, SurveyVersionPreview};

/// Counters reported after every processed response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportProgress {
    pub processed: usize,
    pub written: usize,
    pub skipped: usize,
}

/// Result of a finished export job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub job_id: Uuid,
    pub written: usize,
    /// Responses without a matching survey version
    pub skipped: usize,
    /// Number of columns in the header
    pub columns: usize,
    /// Responses matched to a version through a timestamp fallback
    pub fallback_resolutions: usize,
}

/// One export of a survey's responses.
///
/// # Example
///
/// ```rust
/// use survey_export_sdk::config::ExportConfig;
/// use survey_export_sdk::export::ExportJob;
/// use survey_export_sdk::handlers::HandlerRegistry;
/// use survey_export_sdk::models::{SurveyResponse, SurveyVersionPreview};
///
/// let versions = vec![SurveyVersionPreview::new("v1", 100, 0)];
/// let registry = HandlerRegistry::with_defaults();
/// let config = ExportConfig::default();
///
/// let job = ExportJob::new(&versions, &registry, &config).unwrap();
/// let responses = vec![
///     SurveyResponse::new("r1", "v1", 150),
///     SurveyResponse::new("r2", "", 10),
/// ];
/// let (summary, out) = job.run(Vec::new(), responses, |_| {}).unwrap();
///
/// assert_eq!(summary.written, 2);
/// assert_eq!(summary.fallback_resolutions, 1);
/// assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
/// ```
#[derive(Debug)]
pub struct ExportJob<'a> {
    job_id: Uuid,
    versions: &'a [SurveyVersionPreview],
    registry: &'a HandlerRegistry,
    config: &'a ExportConfig,
    format: ExportFormat,
}

impl<'a> ExportJob<'a> {
    /// Validate the configuration and prepare a job
    pub fn new(
        versions: &'a [SurveyVersionPreview],
        registry: &'a HandlerRegistry,
        config: &'a ExportConfig,
    ) -> Result<Self, ExportError> {
        config.validate()?;
        let format = config.format.parse()?;
        Ok(Self {
            job_id: Uuid::new_v4(),
            versions,
            registry,
            config,
            format,
        })
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    /// Export `responses` to `sink`, returning the summary and the sink.
    ///
    /// Responses whose version cannot be resolved are skipped; any sink error
    /// aborts the run.
    pub fn run<W, I, F>(
        &self,
        sink: W,
        responses: I,
        mut progress: F,
    ) -> Result<(ExportSummary, W), ExportError>
    where
        W: Write,
        I: IntoIterator<Item = SurveyResponse>,
        F: FnMut(&ExportProgress),
    {
        let _span = info_span!(
            "survey_export",
            job_id = %self.job_id,
            survey_key = %self.config.survey_key,
            format = %self.format,
        )
        .entered();

        let separator = self.config.question_option_separator.as_str();
        let columns = ColumnSchemaBuilder::new(self.registry, separator)
            .include_meta(self.config.include_meta)
            .build(self.versions);
        let column_count = columns.len();

        let parser = ResponseParser::new(self.versions, self.registry, separator)
            .include_meta(self.config.include_meta);
        let mut exporter = ResponseExporter::new(self.format, columns, sink);
        exporter.init()?;

        let mut counters = ExportProgress::default();
        let mut fallback_resolutions = 0;
        for response in responses {
            counters.processed += 1;
            match parser.parse(&response) {
                Ok(parsed) => {
                    if parsed.resolution.is_fallback() {
                        fallback_resolutions += 1;
                    }
                    exporter.write_response(&parsed)?;
                    counters.written += 1;
                }
                Err(e) if e.is_recoverable() => {
                    warn!(response_id = %response.id, error = %e, "Skipping response");
                    counters.skipped += 1;
                }
                Err(e) => return Err(e),
            }
            progress(&counters);
        }

        exporter.finish()?;
        let summary = ExportSummary {
            job_id: self.job_id,
            written: counters.written,
            skipped: counters.skipped,
            columns: column_count,
            fallback_resolutions,
        };
        info!(
            written = summary.written,
            skipped = summary.skipped,
            columns = summary.columns,
            "Export finished"
        );
        Ok((summary, exporter.into_inner()?))
    }
}
