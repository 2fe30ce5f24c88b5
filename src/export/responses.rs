//! Response exporter
//!
//! [`ResponseParser`] turns one raw response into a flat column map using
//! the version resolver and the question type handlers. [`ResponseExporter`]
//! writes those maps to a CSV or JSON sink against a fixed column schema.
//!
//! The exporter follows a strict lifecycle:
//! `Created → init() → Initialized → write_response()* → finish() → Finished`.
//! All sink I/O happens inside these three calls.

use std::io::Write;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use tracing::debug;

use super::render::render_value;
use super::{ExportError, ExportFormat};
use crate::columns::{ColumnSchema, fixed, meta, meta_column};
use crate::config::IncludeMeta;
use crate::handlers::{ColumnValues, HandlerRegistry};
use crate::models::{ResponseMeta, SurveyResponse, SurveyVersionPreview};
use crate::resolver::{Resolution, resolve_with_tier};

/// Joiner for timestamp lists in metadata columns
const TIMESTAMP_JOINER: &str = ";";

/// A response flattened into export columns
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub id: String,
    /// Version the response was matched to
    pub version_id: String,
    pub resolution: Resolution,
    pub values: ColumnValues,
}

/// Flattens raw responses against a set of survey versions
#[derive(Debug, Clone)]
pub struct ResponseParser<'a> {
    versions: &'a [SurveyVersionPreview],
    registry: &'a HandlerRegistry,
    separator: String,
    include_meta: IncludeMeta,
}

impl<'a> ResponseParser<'a> {
    pub fn new(
        versions: &'a [SurveyVersionPreview],
        registry: &'a HandlerRegistry,
        separator: impl Into<String>,
    ) -> Self {
        Self {
            versions,
            registry,
            separator: separator.into(),
            include_meta: IncludeMeta::default(),
        }
    }

    pub fn include_meta(mut self, include_meta: IncludeMeta) -> Self {
        self.include_meta = include_meta;
        self
    }

    /// Resolve the response's version and extract all column values.
    ///
    /// Questions of unknown type are left out; only a missing version makes
    /// the whole response fail, with the recoverable
    /// [`ExportError::VersionNotFound`].
    pub fn parse(&self, response: &SurveyResponse) -> Result<ParsedResponse, ExportError> {
        let resolved =
            resolve_with_tier(&response.version_id, response.submitted_at, self.versions)?;
        let version = resolved.version;

        let mut values = ColumnValues::new();
        values.insert(fixed::ID.to_string(), Value::String(response.id.clone()));
        values.insert(
            fixed::PARTICIPANT_ID.to_string(),
            Value::String(response.participant_id.clone()),
        );
        values.insert(
            fixed::VERSION.to_string(),
            Value::String(version.version_id.clone()),
        );
        values.insert(
            fixed::OPENED.to_string(),
            response.opened_at.map(Value::from).unwrap_or(Value::Null),
        );
        values.insert(
            fixed::SUBMITTED.to_string(),
            Value::from(response.submitted_at),
        );

        for question in &version.questions {
            let item = response.item(&question.id);
            match self.registry.parse(question, item, &self.separator) {
                Ok(question_values) => values.extend(question_values),
                Err(e) => {
                    debug!(question = %question.id, error = %e, "Question left out of export row");
                }
            }
            if let Some(item) = item {
                self.insert_meta(&mut values, &question.id, &item.meta);
            }
        }

        Ok(ParsedResponse {
            id: response.id.clone(),
            version_id: version.version_id.clone(),
            resolution: resolved.resolution,
            values,
        })
    }

    fn insert_meta(&self, values: &mut ColumnValues, question_id: &str, item_meta: &ResponseMeta) {
        let lists = [
            (self.include_meta.init_times, meta::INIT, &item_meta.rendered),
            (self.include_meta.displayed_times, meta::DISPLAYED, &item_meta.displayed),
            (self.include_meta.responsed_times, meta::RESPONSE, &item_meta.responded),
        ];
        for (enabled, suffix, timestamps) in lists {
            if enabled {
                values.insert(
                    meta_column(question_id, &self.separator, suffix),
                    Value::String(join_timestamps(timestamps)),
                );
            }
        }
        if self.include_meta.position {
            values.insert(
                meta_column(question_id, &self.separator, meta::POSITION),
                Value::from(item_meta.position),
            );
        }
    }
}

fn join_timestamps(timestamps: &[i64]) -> String {
    timestamps
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(TIMESTAMP_JOINER)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Created,
    Initialized,
    Finished,
}

enum Sink<W: Write> {
    Csv(csv::Writer<W>),
    Json { out: W, first: bool },
}

/// One JSON record: present columns in schema order
struct Record<'a> {
    columns: &'a ColumnSchema,
    values: &'a ColumnValues,
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for column in self.columns.iter() {
            if let Some(value) = self.values.get(column) {
                map.serialize_entry(column, value)?;
            }
        }
        map.end()
    }
}

/// Streams flattened responses to a CSV or JSON sink.
///
/// # Example
///
/// ```rust
/// use survey_export_sdk::columns::ColumnSchema;
/// use survey_export_sdk::export::{ExportFormat, ResponseExporter};
/// use survey_export_sdk::handlers::ColumnValues;
///
/// let columns: ColumnSchema = ["ID", "s.Q1"].into_iter().collect();
/// let mut exporter = ResponseExporter::new(ExportFormat::Csv, columns, Vec::new());
/// exporter.init().unwrap();
///
/// let mut row = ColumnValues::new();
/// row.insert("ID".to_string(), "r1".into());
/// exporter.write_values(&row).unwrap();
/// exporter.finish().unwrap();
///
/// let csv = String::from_utf8(exporter.into_inner().unwrap()).unwrap();
/// assert_eq!(csv, "ID,s.Q1\nr1,\n");
/// ```
pub struct ResponseExporter<W: Write> {
    format: ExportFormat,
    columns: ColumnSchema,
    sink: Sink<W>,
    state: State,
    rows_written: usize,
}

impl<W: Write> ResponseExporter<W> {
    /// Create an exporter writing `format` to `sink`
    pub fn new(format: ExportFormat, columns: ColumnSchema, sink: W) -> Self {
        let sink = match format {
            ExportFormat::Csv => Sink::Csv(csv::Writer::from_writer(sink)),
            ExportFormat::Json => Sink::Json {
                out: sink,
                first: true,
            },
        };
        Self {
            format,
            columns,
            sink,
            state: State::Created,
            rows_written: 0,
        }
    }

    /// Create an exporter from a format name; unknown formats fail here
    pub fn with_format_name(
        format: &str,
        columns: ColumnSchema,
        sink: W,
    ) -> Result<Self, ExportError> {
        Ok(Self::new(format.parse()?, columns, sink))
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn columns(&self) -> &ColumnSchema {
        &self.columns
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }

    /// Write the CSV header or open the JSON container
    pub fn init(&mut self) -> Result<(), ExportError> {
        if self.state != State::Created {
            return Err(ExportError::InvalidState(
                "exporter is already initialized".to_string(),
            ));
        }
        match &mut self.sink {
            Sink::Csv(writer) => writer.write_record(self.columns.iter())?,
            Sink::Json { out, .. } => out.write_all(b"{\"responses\":[")?,
        }
        self.state = State::Initialized;
        Ok(())
    }

    /// Write one parsed response
    pub fn write_response(&mut self, response: &ParsedResponse) -> Result<(), ExportError> {
        self.write_values(&response.values)
    }

    /// Write one row from a flat column map.
    ///
    /// Missing columns render as empty cells (CSV) or are omitted (JSON).
    /// Keys outside the column schema are dropped.
    pub fn write_values(&mut self, values: &ColumnValues) -> Result<(), ExportError> {
        match self.state {
            State::Created => {
                return Err(ExportError::InvalidState(
                    "row written before init".to_string(),
                ));
            }
            State::Finished => {
                return Err(ExportError::InvalidState(
                    "row written after finish".to_string(),
                ));
            }
            State::Initialized => {}
        }

        let dropped = values
            .keys()
            .filter(|key| !self.columns.contains(key))
            .count();
        if dropped > 0 {
            debug!(dropped, "Values without export column dropped");
        }

        match &mut self.sink {
            Sink::Csv(writer) => {
                let record = self
                    .columns
                    .iter()
                    .map(|column| values.get(column).map(render_value).unwrap_or_default());
                writer.write_record(record)?;
            }
            Sink::Json { out, first } => {
                if !*first {
                    out.write_all(b",")?;
                }
                *first = false;
                let record = Record {
                    columns: &self.columns,
                    values,
                };
                serde_json::to_writer(&mut *out, &record)?;
            }
        }
        self.rows_written += 1;
        Ok(())
    }

    /// Close the JSON container and flush the sink.
    ///
    /// Calling `finish` on a finished exporter does nothing. An exporter that
    /// was never initialized is initialized first so the output is complete.
    pub fn finish(&mut self) -> Result<(), ExportError> {
        match self.state {
            State::Finished => return Ok(()),
            State::Created => self.init()?,
            State::Initialized => {}
        }
        match &mut self.sink {
            Sink::Csv(writer) => writer.flush()?,
            Sink::Json { out, .. } => {
                out.write_all(b"]}")?;
                out.flush()?;
            }
        }
        self.state = State::Finished;
        debug!(rows = self.rows_written, format = %self.format, "Export sink finished");
        Ok(())
    }

    /// Hand back the underlying sink; only valid after [`finish`](Self::finish)
    pub fn into_inner(self) -> Result<W, ExportError> {
        if self.state != State::Finished {
            return Err(ExportError::InvalidState(
                "into_inner called before finish".to_string(),
            ));
        }
        match self.sink {
            Sink::Csv(writer) => writer
                .into_inner()
                .map_err(|e| ExportError::Io(e.into_error())),
            Sink::Json { out, .. } => Ok(out),
        }
    }
}
