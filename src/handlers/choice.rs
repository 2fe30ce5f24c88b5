//! Single and multiple choice question family

use serde_json::Value;
use tracing::debug;

use super::{ColumnValues, QuestionTypeHandler, slot_value_key};
use crate::models::{
    OptionType, RESPONSE_ROOT_KEY, ResponseDef, ResponseItem, SurveyItemResponse, SurveyQuestion,
};
use crate::navigation::{item_by_full_path, item_by_short_key};

/// Joiner for the selected keys of a multiple choice slot
const MULTI_SELECT_JOINER: &str = ";";

/// Handler for choice-type questions.
///
/// The slot column holds the selected option key (all selected keys joined
/// with `;` in multiple mode). Options that carry a free value (text, number,
/// date) get a sub-column of their own, and cloze options get one column per
/// declared fill-in field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChoiceHandler {
    multiple: bool,
}

impl ChoiceHandler {
    /// One selected option per slot (single choice, dropdown, likert)
    pub fn single() -> Self {
        Self { multiple: false }
    }

    /// Any number of selected options per slot
    pub fn multiple() -> Self {
        Self { multiple: true }
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    fn parse_slot(
        &self,
        slot: &ResponseDef,
        slot_item: &ResponseItem,
        value_key: &str,
        joiner: &str,
        values: &mut ColumnValues,
    ) {
        let selected: &[ResponseItem] = if self.multiple {
            &slot_item.items
        } else {
            slot_item.items.get(..1).unwrap_or_default()
        };
        if selected.is_empty() {
            return;
        }

        let keys: Vec<&str> = selected.iter().map(|item| item.key.as_str()).collect();
        values.insert(
            value_key.to_string(),
            Value::String(keys.join(MULTI_SELECT_JOINER)),
        );

        for item in selected {
            let option_key = format!("{value_key}{joiner}{}", item.key);
            match slot.option(&item.key).map(|o| &o.option_type) {
                Some(OptionType::Cloze) => parse_cloze(item, &option_key, values),
                Some(option_type) if option_type.has_value_column() => {
                    if let Some(v) = item.value_str() {
                        values.insert(option_key, Value::String(v.to_string()));
                    }
                }
                Some(_) => {}
                None => {
                    debug!(
                        slot = %slot.id,
                        option = %item.key,
                        "Selected option is not part of the schema"
                    );
                }
            }
        }
    }
}

/// Each fill-in field of a cloze answer becomes `option_key.field`.
///
/// A field holding exactly one nested item (e.g. a dropdown inside the cloze)
/// takes that item's value, or its key when it carries none. Otherwise the
/// field's own scalar value is used.
fn parse_cloze(item: &ResponseItem, option_key: &str, values: &mut ColumnValues) {
    for field in &item.items {
        let value = match field.items.as_slice() {
            [nested] => Some(nested.value_str().unwrap_or(&nested.key)),
            _ => field.value_str(),
        };
        if let Some(v) = value {
            values.insert(
                format!("{option_key}.{}", field.key),
                Value::String(v.to_string()),
            );
        }
    }
}

/// Find the slot's item: directly below the root first, anywhere otherwise
pub(crate) fn find_slot_item<'a>(
    root: &'a ResponseItem,
    slot_id: &str,
) -> Option<&'a ResponseItem> {
    item_by_full_path(root, &format!("{RESPONSE_ROOT_KEY}.{slot_id}"))
        .or_else(|| item_by_short_key(root, slot_id))
}

impl QuestionTypeHandler for ChoiceHandler {
    fn response_column_names(&self, question: &SurveyQuestion, separator: &str) -> Vec<String> {
        if question.responses.is_empty() {
            return vec![question.id.clone()];
        }

        let mut columns = Vec::new();
        for slot in &question.responses {
            let (value_key, joiner) = slot_value_key(question, &slot.id, separator);
            let mut option_columns = Vec::new();
            for option in &slot.options {
                let option_key = format!("{value_key}{joiner}{}", option.id);
                if option.option_type.has_value_column() {
                    option_columns.push(option_key);
                } else if option.option_type.is_cloze() {
                    option_columns.extend(
                        option
                            .items
                            .iter()
                            .filter(|field| field.option_type != OptionType::Text)
                            .map(|field| format!("{option_key}.{}", field.id)),
                    );
                }
            }
            columns.push(value_key);
            columns.extend(option_columns);
        }
        columns
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
            let (value_key, joiner) = slot_value_key(question, &slot.id, separator);
            if let Some(slot_item) = find_slot_item(root, &slot.id) {
                self.parse_slot(slot, slot_item, &value_key, &joiner, &mut values);
            }
        }
        values
    }
}
