pub mod analyzer;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod schema;
pub mod storage;
pub mod translator;
pub mod upload;
pub mod view;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use analyzer::{ReportAnalyzer, ReportInput};
pub use config::Settings;
pub use error::{
    AnalysisError, ConfigError, ModelError, SchemaError, StorageError, TranslationError,
};
pub use model::{GeminiClient, GenerateContentRequest, GenerateContentResponse, GenerativeModel};
pub use report::{GlossaryItem, SimplifiedReport};
pub use schema::report_response_schema;
pub use storage::{InMemoryReportStorage, ReportSession, ReportStorage, StorageLimits};
pub use translator::ReportTranslator;
pub use upload::InlineImage;
pub use view::{BASE_LANGUAGE, LanguageSelection, LanguageState, ReportView, is_base_language};
