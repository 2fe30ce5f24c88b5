//! Survey schema model: versions, questions, response slots and options

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A published snapshot of a survey's question schema.
///
/// A version is active between `published` and `unpublished` (both unix
/// seconds). `published == 0` means the version was never explicitly
/// published, `unpublished == 0` means it is still active.
///
/// # Example
///
/// ```rust
/// use survey_export_sdk::models::SurveyVersionPreview;
///
/// let version = SurveyVersionPreview::new("v1", 100, 200);
/// assert!(version.is_active_at(150));
/// assert!(!version.is_active_at(200));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurveyVersionPreview {
    /// Version identifier, unique within a survey (may be empty)
    #[serde(default, rename = "versionID")]
    pub version_id: String,
    /// Publish time in unix seconds (0 = never published)
    #[serde(default)]
    pub published: i64,
    /// Unpublish time in unix seconds (0 = still active)
    #[serde(default)]
    pub unpublished: i64,
    /// Questions in schema order
    #[serde(default)]
    pub questions: Vec<SurveyQuestion>,
}

impl SurveyVersionPreview {
    /// Create a version without questions
    pub fn new(version_id: impl Into<String>, published: i64, unpublished: i64) -> Self {
        Self {
            version_id: version_id.into(),
            published,
            unpublished,
            questions: Vec::new(),
        }
    }

    /// Set the questions of this version
    pub fn with_questions(mut self, questions: Vec<SurveyQuestion>) -> Self {
        self.questions = questions;
        self
    }

    /// Whether the version was active at `timestamp` (published ≤ t < unpublished)
    pub fn is_active_at(&self, timestamp: i64) -> bool {
        self.published <= timestamp && (self.unpublished == 0 || timestamp < self.unpublished)
    }

    /// Look up a question by its full key
    pub fn question(&self, id: &str) -> Option<&SurveyQuestion> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// A single question of a survey version
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurveyQuestion {
    /// Dotted hierarchical key, e.g. `weekly.symptoms.Q1`
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Question type tag used to select a handler (e.g. `single_choice`)
    pub question_type: String,
    /// Response slots in schema order
    #[serde(default)]
    pub responses: Vec<ResponseDef>,
}

impl SurveyQuestion {
    pub fn new(id: impl Into<String>, question_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            question_type: question_type.into(),
            responses: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_responses(mut self, responses: Vec<ResponseDef>) -> Self {
        self.responses = responses;
        self
    }

    /// Question key with the `root_key.` prefix removed, if present
    pub fn short_id(&self, root_key: &str) -> &str {
        if root_key.is_empty() {
            return &self.id;
        }
        self.id
            .strip_prefix(root_key)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(&self.id)
    }
}

/// A response slot of a question (e.g. the single choice group `scg`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDef {
    /// Slot key
    pub id: String,
    #[serde(default)]
    pub response_type: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub options: Vec<ResponseOption>,
}

impl ResponseDef {
    pub fn new(id: impl Into<String>, response_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            response_type: response_type.into(),
            label: String::new(),
            options: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: Vec<ResponseOption>) -> Self {
        self.options = options;
        self
    }

    /// Look up an option by key
    pub fn option(&self, id: &str) -> Option<&ResponseOption> {
        self.options.iter().find(|o| o.id == id)
    }
}

/// A selectable (or fillable) option inside a response slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseOption {
    pub id: String,
    pub option_type: OptionType,
    #[serde(default)]
    pub label: String,
    /// Embedded fill-in fields of a cloze option
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ResponseOption>,
}

impl ResponseOption {
    pub fn new(id: impl Into<String>, option_type: OptionType) -> Self {
        Self {
            id: id.into(),
            option_type,
            label: String::new(),
            items: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_items(mut self, items: Vec<ResponseOption>) -> Self {
        self.items = items;
        self
    }
}

/// Kind of a response option.
///
/// Serialized as the tag string used by survey definitions. Unknown tags are
/// preserved as [`OptionType::Other`] and treated as data-bearing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OptionType {
    /// Single choice marker
    Radio,
    /// Dropdown entry
    DropdownOption,
    /// Multiple choice marker
    Checkbox,
    /// Choice with embedded fill-in fields
    Cloze,
    /// Free text input
    TextInput,
    /// Multi-line free text input
    MultilineTextInput,
    NumberInput,
    DateInput,
    TimeInput,
    /// Display-only text
    Text,
    Other(String),
}

impl OptionType {
    /// Tag string as it appears in survey definitions
    pub fn as_str(&self) -> &str {
        match self {
            OptionType::Radio => "radio",
            OptionType::DropdownOption => "dropDownOption",
            OptionType::Checkbox => "option",
            OptionType::Cloze => "cloze",
            OptionType::TextInput => "input",
            OptionType::MultilineTextInput => "multilineTextInput",
            OptionType::NumberInput => "numberInput",
            OptionType::DateInput => "dateInput",
            OptionType::TimeInput => "timeInput",
            OptionType::Text => "text",
            OptionType::Other(tag) => tag,
        }
    }

    /// Whether selecting this option carries no value besides its own key.
    ///
    /// Marker options never get a sub-column of their own.
    pub fn is_selection_marker(&self) -> bool {
        matches!(
            self,
            OptionType::Radio
                | OptionType::DropdownOption
                | OptionType::Checkbox
                | OptionType::Cloze
        )
    }

    /// Whether the option gets its own sub-column for a free value
    pub fn has_value_column(&self) -> bool {
        !self.is_selection_marker() && !matches!(self, OptionType::Text)
    }

    pub fn is_cloze(&self) -> bool {
        matches!(self, OptionType::Cloze)
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for OptionType {
    fn from(s: &str) -> Self {
        match s {
            "radio" => OptionType::Radio,
            "dropDownOption" | "dropdownOption" | "dropdown" => OptionType::DropdownOption,
            "option" | "checkbox" => OptionType::Checkbox,
            "cloze" => OptionType::Cloze,
            "input" | "textInput" => OptionType::TextInput,
            "multilineTextInput" => OptionType::MultilineTextInput,
            "numberInput" => OptionType::NumberInput,
            "dateInput" => OptionType::DateInput,
            "timeInput" => OptionType::TimeInput,
            "text" => OptionType::Text,
            other => OptionType::Other(other.to_string()),
        }
    }
}

impl Serialize for OptionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OptionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(OptionType::from(tag.as_str()))
    }
}
