//! Free input question family (text, number, date, slider)

use serde_json::Value;

use super::choice::find_slot_item;
use super::{ColumnValues, QuestionTypeHandler, slot_value_key};
use crate::models::{ResponseItem, SurveyItemResponse, SurveyQuestion};

/// Handler for questions whose slots hold one entered value each.
///
/// One column per slot; the value is the slot item's scalar, or the scalar
/// of its only child when the input is wrapped in a group.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputHandler;

fn slot_value(slot_item: &ResponseItem) -> Option<&str> {
    slot_item.value_str().or_else(|| match slot_item.items.as_slice() {
        [only] => only.value_str(),
        _ => None,
    })
}

impl QuestionTypeHandler for InputHandler {
    fn response_column_names(&self, question: &SurveyQuestion, separator: &str) -> Vec<String> {
        if question.responses.is_empty() {
            return vec![question.id.clone()];
        }
        question
            .responses
            .iter()
            .map(|slot| slot_value_key(question, &slot.id, separator).0)
            .collect()
    }

    fn parse_response(
        &self,
        question: &SurveyQuestion,
        response: Option<&SurveyItemResponse>,
        separator: &str,
    ) -> ColumnValues {
        let mut values = ColumnValues::new();
        let Some(root) = response.and_then(|r| r.response.as_ref()) else {
            return values;
        };

        for slot in &question.responses {
            let value = find_slot_item(root, &slot.id).and_then(slot_value);
            if let Some(v) = value {
                let (value_key, _) = slot_value_key(question, &slot.id, separator);
                values.insert(value_key, Value::String(v.to_string()));
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResponseDef;

    #[test]
    fn test_single_input() {
        let question = SurveyQuestion::new("intake.age", "numeric_input")
            .with_responses(vec![ResponseDef::new("num", "numberInput")]);
        let response = SurveyItemResponse::new(
            "intake.age",
            ResponseItem::group("rg", vec![ResponseItem::with_value("num", "37")]),
        );

        assert_eq!(
            InputHandler.response_column_names(&question, "-"),
            vec!["intake.age"]
        );
        let values = InputHandler.parse_response(&question, Some(&response), "-");
        assert_eq!(values["intake.age"], Value::String("37".to_string()));
    }

    #[test]
    fn test_multi_slot_input() {
        let question = SurveyQuestion::new("intake.contact", "text_input").with_responses(vec![
            ResponseDef::new("zip", "input"),
            ResponseDef::new("city", "input"),
        ]);
        let response = SurveyItemResponse::new(
            "intake.contact",
            ResponseItem::group(
                "rg",
                vec![
                    ResponseItem::with_value("zip", "1012"),
                    ResponseItem::group("city", vec![ResponseItem::with_value("txt", "Utrecht")]),
                ],
            ),
        );

        assert_eq!(
            InputHandler.response_column_names(&question, "-"),
            vec!["intake.contact-zip", "intake.contact-city"]
        );
        let values = InputHandler.parse_response(&question, Some(&response), "-");
        assert_eq!(values["intake.contact-zip"], Value::String("1012".to_string()));
        assert_eq!(values["intake.contact-city"], Value::String("Utrecht".to_string()));
    }

    #[test]
    fn test_empty_input_is_omitted() {
        let question = SurveyQuestion::new("intake.age", "numeric_input")
            .with_responses(vec![ResponseDef::new("num", "numberInput")]);
        let response = SurveyItemResponse::new(
            "intake.age",
            ResponseItem::group("rg", vec![ResponseItem::with_value("num", "")]),
        );
        assert!(InputHandler.parse_response(&question, Some(&response), "-").is_empty());
    }
}
