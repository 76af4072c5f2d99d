use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    error::TranslationError,
    model::{Content, GenerateContentRequest, GenerationConfig, GenerativeModel, Part},
    report::SimplifiedReport,
    schema::report_response_schema,
};

/// Translates a finished report while keeping its structure intact
#[derive(Clone)]
pub struct ReportTranslator {
    model: Arc<dyn GenerativeModel>,
}

impl ReportTranslator {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Produce a new report with every string rendered in `target_language`.
    ///
    /// The source report is left untouched. The translated report is
    /// validated on its own; its sequence lengths may differ from the source.
    pub async fn translate(
        &self,
        report: &SimplifiedReport,
        target_language: &str,
    ) -> Result<SimplifiedReport, TranslationError> {
        let target_language = target_language.trim();
        if target_language.is_empty() {
            return Err(TranslationError::MissingLanguage);
        }

        info!(language = %target_language, "Starting report translation");

        let request = build_translation_request(report, target_language)?;
        let response = self.model.generate_content(request).await?;

        let payload = response.text().ok_or_else(|| {
            warn!(language = %target_language, "Translation returned no textual payload");
            TranslationError::EmptyResponse
        })?;

        let translated = SimplifiedReport::from_model_output(&payload)?;

        info!(language = %target_language, "Report translation completed");
        Ok(translated)
    }
}

/// The whole report is embedded as JSON; the model returns the same shape
pub fn build_translation_request(
    report: &SimplifiedReport,
    target_language: &str,
) -> Result<GenerateContentRequest, TranslationError> {
    let report_json = serde_json::to_string_pretty(report)
        .map_err(|e| TranslationError::Malformed(e.into()))?;

    let prompt = format!(
        "You are a medical translation assistant.
Translate the following simplified medical report into {}.

- Keep the medical meaning accurate.
- Maintain the SAME JSON structure as the input.
- Do not add or remove any fields.

Input JSON:
{}",
        target_language, report_json
    );

    Ok(GenerateContentRequest {
        contents: vec![Content::user(vec![Part::text(prompt)])],
        system_instruction: None,
        generation_config: GenerationConfig::structured(report_response_schema()),
    })
}
