//! Question type handlers
//!
//! Each question type knows two things about itself:
//! - which export columns it produces (from the schema alone)
//! - how to turn an answer tree into values for those columns
//!
//! Handlers are looked up by the question's type tag through an explicitly
//! constructed [`HandlerRegistry`]. Available handlers:
//! - [`ChoiceHandler`]: single choice, dropdown, likert and multiple choice
//! - [`InputHandler`]: text, number, date and slider inputs

mod choice;
mod input;
mod registry;

use std::collections::HashMap;

use serde_json::Value;

use crate::models::{SurveyItemResponse, SurveyQuestion};

pub use choice::ChoiceHandler;
pub use input::InputHandler;
pub use registry::HandlerRegistry;

/// Flat column name → value map produced for one question or one response
pub type ColumnValues = HashMap<String, Value>;

/// Question type tags understood by [`HandlerRegistry::with_defaults`]
pub mod question_types {
    pub const SINGLE_CHOICE: &str = "single_choice";
    pub const MULTIPLE_CHOICE: &str = "multiple_choice";
    pub const DROPDOWN: &str = "dropdown";
    pub const LIKERT: &str = "likert";
    pub const RESPONSIVE_SINGLE_CHOICE_ARRAY: &str = "responsive_single_choice_array";
    pub const TEXT_INPUT: &str = "text_input";
    pub const MULTILINE_TEXT_INPUT: &str = "multiline_text_input";
    pub const NUMERIC_INPUT: &str = "numeric_input";
    pub const DATE_INPUT: &str = "date_input";
    pub const SLIDER_NUMERIC: &str = "slider_numeric";
}

/// Error during handler lookup
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HandlerError {
    #[error("No handler registered for question type '{0}'")]
    UnknownQuestionType(String),
}

/// Column naming and value extraction for one family of question types.
///
/// Implementations must be pure: the same question always yields the same
/// column names, and `parse_response` only emits keys that
/// `response_column_names` lists for that question.
pub trait QuestionTypeHandler: Send + Sync {
    /// Export columns this question contributes
    fn response_column_names(&self, question: &SurveyQuestion, separator: &str) -> Vec<String>;

    /// Values extracted from the answer, keyed by export column
    fn parse_response(
        &self,
        question: &SurveyQuestion,
        response: Option<&SurveyItemResponse>,
        separator: &str,
    ) -> ColumnValues;
}

/// Column key of a response slot and the joiner used for its option columns.
///
/// A single-slot question uses the question key itself and the configured
/// separator; slots of a multi-slot question get `question + sep + slot` and
/// join their options with `.`.
pub(crate) fn slot_value_key(
    question: &SurveyQuestion,
    slot_id: &str,
    separator: &str,
) -> (String, String) {
    if question.responses.len() <= 1 {
        (question.id.clone(), separator.to_string())
    } else {
        (
            format!("{}{}{}", question.id, separator, slot_id),
            ".".to_string(),
        )
    }
}
