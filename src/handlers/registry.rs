//! Registry mapping question type tags to handlers

use std::collections::HashMap;
use std::sync::Arc;

use super::question_types::*;
use super::{ChoiceHandler, ColumnValues, HandlerError, InputHandler, QuestionTypeHandler};
use crate::models::{SurveyItemResponse, SurveyQuestion};

/// Immutable lookup table from question type tag to handler.
///
/// Built once and passed into the exporter; cloning is cheap because
/// handlers are shared behind `Arc`.
///
/// # Example
///
/// ```rust
/// use survey_export_sdk::handlers::{HandlerRegistry, InputHandler};
/// use survey_export_sdk::models::{ResponseDef, SurveyQuestion};
///
/// let registry = HandlerRegistry::with_defaults().register("eq5d_health_indicator", InputHandler);
/// let question = SurveyQuestion::new("s.health", "eq5d_health_indicator")
///     .with_responses(vec![ResponseDef::new("eq5d", "eq5d")]);
/// assert_eq!(registry.column_names(&question, "-").unwrap(), vec!["s.health"]);
/// ```
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn QuestionTypeHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with handlers for all built-in question types
    pub fn with_defaults() -> Self {
        let single: Arc<dyn QuestionTypeHandler> = Arc::new(ChoiceHandler::single());
        let input: Arc<dyn QuestionTypeHandler> = Arc::new(InputHandler);

        let mut registry = Self::new();
        for tag in [
            SINGLE_CHOICE,
            DROPDOWN,
            LIKERT,
            RESPONSIVE_SINGLE_CHOICE_ARRAY,
        ] {
            registry.handlers.insert(tag.to_string(), single.clone());
        }
        registry.handlers.insert(
            MULTIPLE_CHOICE.to_string(),
            Arc::new(ChoiceHandler::multiple()),
        );
        for tag in [
            TEXT_INPUT,
            MULTILINE_TEXT_INPUT,
            NUMERIC_INPUT,
            DATE_INPUT,
            SLIDER_NUMERIC,
        ] {
            registry.handlers.insert(tag.to_string(), input.clone());
        }
        registry
    }

    /// Add or replace the handler for a question type tag
    pub fn register(
        mut self,
        question_type: impl Into<String>,
        handler: impl QuestionTypeHandler + 'static,
    ) -> Self {
        self.handlers
            .insert(question_type.into(), Arc::new(handler));
        self
    }

    /// Handler for a question type tag
    pub fn get(&self, question_type: &str) -> Result<&dyn QuestionTypeHandler, HandlerError> {
        self.handlers
            .get(question_type)
            .map(|h| h.as_ref())
            .ok_or_else(|| HandlerError::UnknownQuestionType(question_type.to_string()))
    }

    pub fn contains(&self, question_type: &str) -> bool {
        self.handlers.contains_key(question_type)
    }

    /// Registered tags, sorted
    pub fn question_types(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.handlers.keys().map(|k| k.as_str()).collect();
        tags.sort_unstable();
        tags
    }

    /// Export columns of a question via its type's handler
    pub fn column_names(
        &self,
        question: &SurveyQuestion,
        separator: &str,
    ) -> Result<Vec<String>, HandlerError> {
        Ok(self
            .get(&question.question_type)?
            .response_column_names(question, separator))
    }

    /// Extracted values of an answer via its question type's handler
    pub fn parse(
        &self,
        question: &SurveyQuestion,
        response: Option<&SurveyItemResponse>,
        separator: &str,
    ) -> Result<ColumnValues, HandlerError> {
        Ok(self
            .get(&question.question_type)?
            .parse_response(question, response, separator))
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("question_types", &self.question_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_choice_and_input() {
        let registry = HandlerRegistry::with_defaults();
        assert!(registry.contains(SINGLE_CHOICE));
        assert!(registry.contains(MULTIPLE_CHOICE));
        assert!(registry.contains(DATE_INPUT));
        assert!(!registry.contains("matrix"));
    }

    #[test]
    fn test_unknown_type_is_error() {
        let registry = HandlerRegistry::with_defaults();
        let question = SurveyQuestion::new("s.Q9", "matrix");
        let err = registry.column_names(&question, "-").unwrap_err();
        assert_eq!(err, HandlerError::UnknownQuestionType("matrix".to_string()));
        assert!(registry.parse(&question, None, "-").is_err());
    }

    #[test]
    fn test_register_overrides() {
        struct Fixed;
        impl QuestionTypeHandler for Fixed {
            fn response_column_names(&self, q: &SurveyQuestion, _sep: &str) -> Vec<String> {
                vec![format!("{}.fixed", q.id)]
            }
            fn parse_response(
                &self,
                _q: &SurveyQuestion,
                _r: Option<&SurveyItemResponse>,
                _sep: &str,
            ) -> ColumnValues {
                ColumnValues::new()
            }
        }

        let registry = HandlerRegistry::with_defaults().register(SINGLE_CHOICE, Fixed);
        let question = SurveyQuestion::new("s.Q1", SINGLE_CHOICE);
        assert_eq!(
            registry.column_names(&question, "-").unwrap(),
            vec!["s.Q1.fixed".to_string()]
        );
    }
}
