use thiserror::Error;

/// Failures talking to the generative model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Model API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Model response could not be decoded: {0}")]
    Decode(String),
}

/// The model's payload does not have the shape of a simplified report
#[derive(Debug, Error)]
#[error("Model output is not a valid simplified report: {0}")]
pub struct SchemaError(#[from] pub serde_json::Error);

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Please provide the report text or an image of the report.")]
    MissingInput,

    #[error("Please provide either the report text or an image, not both.")]
    ConflictingInput,

    /// Generic failure shown to the user; the cause is only logged
    #[error("Failed to analyze the report. Please try again or check your input.")]
    Failed,
}

impl AnalysisError {
    /// Whether the error was raised before any remote call was made
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::MissingInput | Self::ConflictingInput)
    }
}

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Translation failed: no target language given.")]
    MissingLanguage,

    #[error("Translation failed: empty response.")]
    EmptyResponse,

    #[error(transparent)]
    Malformed(#[from] SchemaError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY (or API_KEY) environment variable is required")]
    MissingApiKey,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Report storage backend failed: {0}")]
    Backend(String),
}
