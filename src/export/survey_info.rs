//! Survey info (codebook) exporter
//!
//! Flattens the survey schema itself into one row per
//! (version, question, slot, option), independent of any response data.

use std::io::Write;

use chrono::{DateTime, SecondsFormat};
use serde::Serialize;
use tracing::info;

use super::{ExportError, ExportFormat};
use crate::config::ExportConfig;
use crate::models::{ResponseDef, ResponseOption, SurveyQuestion, SurveyVersionPreview};

/// Header of the codebook CSV
pub const SURVEY_INFO_COLUMNS: [&str; 11] = [
    "versionID",
    "published",
    "unpublished",
    "questionKey",
    "title",
    "questionType",
    "responseKey",
    "responseType",
    "optionKey",
    "optionType",
    "optionLabel",
];

/// One flattened codebook row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyInfoRow {
    pub version_id: String,
    pub published: String,
    pub unpublished: String,
    pub question_key: String,
    pub title: String,
    pub question_type: String,
    pub response_key: String,
    pub response_type: String,
    pub option_key: String,
    pub option_type: String,
    pub option_label: String,
}

impl SurveyInfoRow {
    fn to_record(&self) -> [&str; 11] {
        [
            self.version_id.as_str(),
            self.published.as_str(),
            self.unpublished.as_str(),
            self.question_key.as_str(),
            self.title.as_str(),
            self.question_type.as_str(),
            self.response_key.as_str(),
            self.response_type.as_str(),
            self.option_key.as_str(),
            self.option_type.as_str(),
            self.option_label.as_str(),
        ]
    }
}

/// Render unix seconds as RFC 3339 UTC; 0 (unset) renders empty
pub fn format_timestamp(timestamp: i64) -> String {
    if timestamp == 0 {
        return String::new();
    }
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| timestamp.to_string())
}

/// JSON view of a version with shortened question keys
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionInfo<'a> {
    #[serde(rename = "versionID")]
    version_id: &'a str,
    published: String,
    unpublished: String,
    questions: Vec<QuestionInfo<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionInfo<'a> {
    key: &'a str,
    title: &'a str,
    question_type: &'a str,
    responses: &'a [ResponseDef],
}

#[derive(Serialize)]
struct SurveyInfo<'a> {
    versions: Vec<VersionInfo<'a>>,
}

/// Exports the question schema of all versions as a codebook.
///
/// # Example
///
/// ```rust
/// use survey_export_sdk::export::{ExportFormat, SurveyInfoExporter};
/// use survey_export_sdk::models::{SurveyQuestion, SurveyVersionPreview};
///
/// let versions = vec![SurveyVersionPreview::new("v1", 0, 0)
///     .with_questions(vec![SurveyQuestion::new("weekly.Q1", "display")])];
///
/// let exporter = SurveyInfoExporter::new().with_short_keys("weekly");
/// let out = exporter.export(&versions, ExportFormat::Csv, Vec::new()).unwrap();
/// let csv = String::from_utf8(out).unwrap();
/// assert!(csv.lines().nth(1).unwrap().starts_with("v1,,,Q1,"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SurveyInfoExporter {
    short_keys: bool,
    survey_key: String,
}

impl SurveyInfoExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip `survey_key.` from every question key
    pub fn with_short_keys(mut self, survey_key: impl Into<String>) -> Self {
        self.short_keys = true;
        self.survey_key = survey_key.into();
        self
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            short_keys: config.short_keys,
            survey_key: config.survey_key.clone(),
        }
    }

    fn question_key<'q>(&self, question: &'q SurveyQuestion) -> &'q str {
        if self.short_keys {
            question.short_id(&self.survey_key)
        } else {
            &question.id
        }
    }

    /// Flatten all versions into codebook rows
    pub fn rows(&self, versions: &[SurveyVersionPreview]) -> Vec<SurveyInfoRow> {
        let mut rows = Vec::new();
        for version in versions {
            let base = SurveyInfoRow {
                version_id: version.version_id.clone(),
                published: format_timestamp(version.published),
                unpublished: format_timestamp(version.unpublished),
                ..SurveyInfoRow::default()
            };
            for question in &version.questions {
                let question_row = SurveyInfoRow {
                    question_key: self.question_key(question).to_string(),
                    title: question.title.clone(),
                    question_type: question.question_type.clone(),
                    ..base.clone()
                };
                if question.responses.is_empty() {
                    rows.push(question_row);
                    continue;
                }
                for slot in &question.responses {
                    let slot_row = SurveyInfoRow {
                        response_key: slot.id.clone(),
                        response_type: slot.response_type.clone(),
                        ..question_row.clone()
                    };
                    if slot.options.is_empty() {
                        rows.push(slot_row);
                        continue;
                    }
                    for option in &slot.options {
                        push_option_rows(&mut rows, &slot_row, option);
                    }
                }
            }
        }
        rows
    }

    /// Write the codebook to `sink` and hand the sink back
    pub fn export<W: Write>(
        &self,
        versions: &[SurveyVersionPreview],
        format: ExportFormat,
        sink: W,
    ) -> Result<W, ExportError> {
        let sink = match format {
            ExportFormat::Csv => self.write_csv(versions, sink)?,
            ExportFormat::Json => self.write_json(versions, sink)?,
        };
        info!(versions = versions.len(), format = %format, "Exported survey info");
        Ok(sink)
    }

    fn write_csv<W: Write>(
        &self,
        versions: &[SurveyVersionPreview],
        sink: W,
    ) -> Result<W, ExportError> {
        let mut writer = csv::Writer::from_writer(sink);
        writer.write_record(SURVEY_INFO_COLUMNS)?;
        for row in self.rows(versions) {
            writer.write_record(row.to_record())?;
        }
        writer.flush()?;
        writer
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))
    }

    fn write_json<W: Write>(
        &self,
        versions: &[SurveyVersionPreview],
        mut sink: W,
    ) -> Result<W, ExportError> {
        let info = SurveyInfo {
            versions: versions
                .iter()
                .map(|version| VersionInfo {
                    version_id: &version.version_id,
                    published: format_timestamp(version.published),
                    unpublished: format_timestamp(version.unpublished),
                    questions: version
                        .questions
                        .iter()
                        .map(|question| QuestionInfo {
                            key: self.question_key(question),
                            title: &question.title,
                            question_type: &question.question_type,
                            responses: &question.responses,
                        })
                        .collect(),
                })
                .collect(),
        };
        serde_json::to_writer(&mut sink, &info)?;
        sink.flush()?;
        Ok(sink)
    }
}

fn push_option_rows(
    rows: &mut Vec<SurveyInfoRow>,
    slot_row: &SurveyInfoRow,
    option: &ResponseOption,
) {
    rows.push(SurveyInfoRow {
        option_key: option.id.clone(),
        option_type: option.option_type.to_string(),
        option_label: option.label.clone(),
        ..slot_row.clone()
    });
    for field in &option.items {
        rows.push(SurveyInfoRow {
            option_key: format!("{}.{}", option.id, field.id),
            option_type: field.option_type.to_string(),
            option_label: field.label.clone(),
            ..slot_row.clone()
        });
    }
}
