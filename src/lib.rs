//! Survey Export SDK - Flattens versioned survey responses into tabular exports
//!
//! Provides unified interfaces for:
//! - Survey schema and response models
//! - Version resolution (which schema a response was answered against)
//! - Question type handlers (column naming and answer extraction)
//! - Response tree navigation
//! - Response export (CSV/JSON) and survey info (codebook) export

pub mod columns;
pub mod config;
pub mod export;
pub mod handlers;
pub mod models;
pub mod navigation;
pub mod resolver;

// Re-export commonly used types
pub use columns::{ColumnSchema, ColumnSchemaBuilder};
pub use config::{ConfigError, ExportConfig, IncludeMeta};
pub use export::{
    ExportError, ExportFormat, ExportJob, ExportProgress, ExportSummary, ParsedResponse,
    ResponseExporter, ResponseParser, SurveyInfoExporter,
};
pub use handlers::{HandlerError, HandlerRegistry, QuestionTypeHandler};
pub use resolver::{ResolveError, Resolution, resolve};

// Re-export models
pub use models::{
    OptionType, ResponseDef, ResponseItem, ResponseMeta, ResponseOption, SurveyItemResponse,
    SurveyQuestion, SurveyResponse, SurveyVersionPreview,
};
