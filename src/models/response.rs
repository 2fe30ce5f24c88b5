//! Raw response model: answer trees and response records

use serde::{Deserialize, Serialize};

/// Key of the root item of every question's answer tree
pub const RESPONSE_ROOT_KEY: &str = "rg";

/// A node of an answer tree.
///
/// Nodes own their children; the tree mirrors the schema's slot and option
/// nesting (`rg` → slot → selected option → cloze fields).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseItem {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ResponseItem>,
}

impl ResponseItem {
    /// Create a leaf without a value
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            items: Vec::new(),
        }
    }

    /// Create a leaf carrying a scalar value
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            items: Vec::new(),
        }
    }

    /// Create a group node
    pub fn group(key: impl Into<String>, items: Vec<ResponseItem>) -> Self {
        Self {
            key: key.into(),
            value: None,
            items,
        }
    }

    /// Direct child with the given key
    pub fn child(&self, key: &str) -> Option<&ResponseItem> {
        self.items.iter().find(|item| item.key == key)
    }

    /// The scalar value, treating an empty string as absent
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Per-question display and interaction metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    /// Position of the question in the rendered survey (-1 when unknown)
    #[serde(default = "default_position")]
    pub position: i32,
    /// Times the question was rendered (unix seconds)
    #[serde(default)]
    pub rendered: Vec<i64>,
    /// Times the question became visible
    #[serde(default)]
    pub displayed: Vec<i64>,
    /// Times the answer changed
    #[serde(default)]
    pub responded: Vec<i64>,
}

fn default_position() -> i32 {
    -1
}

impl Default for ResponseMeta {
    fn default() -> Self {
        Self {
            position: default_position(),
            rendered: Vec::new(),
            displayed: Vec::new(),
            responded: Vec::new(),
        }
    }
}

/// The answer to one question
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurveyItemResponse {
    /// Full question key
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseItem>,
    #[serde(default)]
    pub meta: ResponseMeta,
}

impl SurveyItemResponse {
    pub fn new(key: impl Into<String>, response: ResponseItem) -> Self {
        Self {
            key: key.into(),
            response: Some(response),
            meta: ResponseMeta::default(),
        }
    }

    /// Answer with no tree (question shown but left empty)
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            response: None,
            meta: ResponseMeta::default(),
        }
    }

    pub fn with_meta(mut self, meta: ResponseMeta) -> Self {
        self.meta = meta;
        self
    }
}

/// A raw submitted response record as supplied by the storage layer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "participantID")]
    pub participant_id: String,
    /// Version the client reported, may be empty
    #[serde(default, rename = "versionID")]
    pub version_id: String,
    /// Submission time in unix seconds
    pub submitted_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opened_at: Option<i64>,
    #[serde(default)]
    pub responses: Vec<SurveyItemResponse>,
}

impl SurveyResponse {
    pub fn new(id: impl Into<String>, version_id: impl Into<String>, submitted_at: i64) -> Self {
        Self {
            id: id.into(),
            participant_id: String::new(),
            version_id: version_id.into(),
            submitted_at,
            opened_at: None,
            responses: Vec::new(),
        }
    }

    pub fn with_participant(mut self, participant_id: impl Into<String>) -> Self {
        self.participant_id = participant_id.into();
        self
    }

    pub fn with_responses(mut self, responses: Vec<SurveyItemResponse>) -> Self {
        self.responses = responses;
        self
    }

    /// Answer for the given question key
    pub fn item(&self, question_id: &str) -> Option<&SurveyItemResponse> {
        self.responses.iter().find(|r| r.key == question_id)
    }
}
