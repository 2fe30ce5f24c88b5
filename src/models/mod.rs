//! Models module for the SDK
//!
//! Defines the survey schema snapshots and the raw response records the
//! export engine reads. All types are plain owned data and never mutated by
//! the engine.

pub mod response;
pub mod survey;

pub use response::{
    RESPONSE_ROOT_KEY, ResponseItem, ResponseMeta, SurveyItemResponse, SurveyResponse,
};
pub use survey::{OptionType, ResponseDef, ResponseOption, SurveyQuestion, SurveyVersionPreview};
