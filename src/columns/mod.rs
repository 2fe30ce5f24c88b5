//! Unioned export column schema
//!
//! The header of an export must be fixed before the first row is written,
//! so the columns of every question of every version are collected up front.
//! Order is by first appearance: fixed response columns, then versions in
//! input order and questions in schema order.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::IncludeMeta;
use crate::handlers::HandlerRegistry;
use crate::models::SurveyVersionPreview;

/// Response-level columns that lead every export
pub mod fixed {
    pub const ID: &str = "ID";
    pub const PARTICIPANT_ID: &str = "participantID";
    pub const VERSION: &str = "version";
    pub const OPENED: &str = "opened";
    pub const SUBMITTED: &str = "submitted";

    pub const ALL: [&str; 5] = [ID, PARTICIPANT_ID, VERSION, OPENED, SUBMITTED];
}

/// Suffixes of per-question metadata columns
pub mod meta {
    pub const INIT: &str = "metaInit";
    pub const DISPLAYED: &str = "metaDisplayed";
    pub const RESPONSE: &str = "metaResponse";
    pub const POSITION: &str = "metaPosition";
}

/// Name of a per-question metadata column
pub fn meta_column(question_id: &str, separator: &str, suffix: &str) -> String {
    format!("{question_id}{separator}{suffix}")
}

/// Ordered, deduplicated set of export column names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSchema {
    columns: Vec<String>,
    lookup: HashSet<String>,
}

impl ColumnSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column unless already present; returns whether it was added
    pub fn push(&mut self, column: impl Into<String>) -> bool {
        let column = column.into();
        if self.lookup.contains(&column) {
            return false;
        }
        self.lookup.insert(column.clone());
        self.columns.push(column);
        true
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, column: &str) -> bool {
        self.lookup.contains(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.as_str())
    }
}

impl<S: Into<String>> FromIterator<S> for ColumnSchema {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut schema = ColumnSchema::new();
        for column in iter {
            schema.push(column);
        }
        schema
    }
}

/// Builds the column union across all versions of a survey.
///
/// # Example
///
/// ```rust
/// use survey_export_sdk::columns::ColumnSchemaBuilder;
/// use survey_export_sdk::handlers::HandlerRegistry;
/// use survey_export_sdk::models::{ResponseDef, SurveyQuestion, SurveyVersionPreview};
///
/// let registry = HandlerRegistry::with_defaults();
/// let versions = vec![SurveyVersionPreview::new("v1", 100, 0).with_questions(vec![
///     SurveyQuestion::new("s.age", "numeric_input")
///         .with_responses(vec![ResponseDef::new("num", "numberInput")]),
/// ])];
///
/// let schema = ColumnSchemaBuilder::new(&registry, "-").build(&versions);
/// assert!(schema.contains("s.age"));
/// assert_eq!(schema.columns()[0], "ID");
/// ```
#[derive(Debug, Clone)]
pub struct ColumnSchemaBuilder<'a> {
    registry: &'a HandlerRegistry,
    separator: String,
    include_meta: IncludeMeta,
    include_fixed: bool,
}

impl<'a> ColumnSchemaBuilder<'a> {
    pub fn new(registry: &'a HandlerRegistry, separator: impl Into<String>) -> Self {
        Self {
            registry,
            separator: separator.into(),
            include_meta: IncludeMeta::default(),
            include_fixed: true,
        }
    }

    /// Select the metadata columns to add per question
    pub fn include_meta(mut self, include_meta: IncludeMeta) -> Self {
        self.include_meta = include_meta;
        self
    }

    /// Leave out the fixed response-level columns
    pub fn without_fixed_columns(mut self) -> Self {
        self.include_fixed = false;
        self
    }

    /// Collect the columns of all questions across all versions
    pub fn build(&self, versions: &[SurveyVersionPreview]) -> ColumnSchema {
        let mut schema = ColumnSchema::new();
        if self.include_fixed {
            for column in fixed::ALL {
                schema.push(column);
            }
        }

        for version in versions {
            for question in &version.questions {
                match self.registry.column_names(question, &self.separator) {
                    Ok(columns) => {
                        for column in columns {
                            schema.push(column);
                        }
                    }
                    Err(e) => {
                        warn!(
                            version_id = %version.version_id,
                            question = %question.id,
                            error = %e,
                            "Skipping response columns of question"
                        );
                    }
                }
                self.push_meta_columns(&mut schema, &question.id);
            }
        }

        debug!(
            versions = versions.len(),
            columns = schema.len(),
            "Built export column schema"
        );
        schema
    }

    fn push_meta_columns(&self, schema: &mut ColumnSchema, question_id: &str) {
        let flags = [
            (self.include_meta.init_times, meta::INIT),
            (self.include_meta.displayed_times, meta::DISPLAYED),
            (self.include_meta.responsed_times, meta::RESPONSE),
            (self.include_meta.position, meta::POSITION),
        ];
        for (enabled, suffix) in flags {
            if enabled {
                schema.push(meta_column(question_id, &self.separator, suffix));
            }
        }
    }
}
