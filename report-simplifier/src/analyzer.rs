use std::sync::Arc;

use tracing::{error, info};

use crate::{
    error::AnalysisError,
    model::{Content, GenerateContentRequest, GenerationConfig, GenerativeModel, Part},
    report::SimplifiedReport,
    schema::report_response_schema,
    upload::InlineImage,
};

const ANALYSIS_SYSTEM_INSTRUCTION: &str = r#"You are an empathetic, professional, and highly skilled medical assistant designed to help patients understand their medical reports.
Your goal is to analyze medical text or images of reports and translate them into clear, simple, plain English suitable for a layperson (6th-grade reading level).

Guidelines:
1. Tone: Reassuring, calm, and objective.
2. Clarity: Avoid jargon. If a medical term is necessary, explain it immediately in parentheses or include it in the glossary.
3. Structure: Break down the information into a summary, key takeaways, and a glossary of terms.
4. Privacy: Do not output any PII (Personally Identifiable Information) like names, dates of birth, or IDs found in the source.
5. Accuracy: Do not invent information. If the text is illegible or unclear, state that."#;

const ANALYSIS_PROMPT: &str = r#"Please analyze the provided medical report.

Output the result in the following JSON format:
{
  "summary": "A paragraph summarizing the main findings in simple language.",
  "keyPoints": ["Bullet point 1", "Bullet point 2", ...],
  "glossary": [
    {"term": "Medical Term", "definition": "Simple explanation"}
  ],
  "disclaimer": "A standard medical disclaimer stating this is AI-generated and not a replacement for professional medical advice."
}"#;

/// What the user submitted for analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportInput {
    Text(String),
    /// Base64 image data, optionally with a data-URI header
    Image(String),
}

impl ReportInput {
    /// Exactly one of `text` or `image` must be present. Whitespace-only
    /// values count as absent.
    pub fn from_parts(text: Option<&str>, image: Option<&str>) -> Result<Self, AnalysisError> {
        let text = text.filter(|t| !t.trim().is_empty());
        let image = image.filter(|i| !i.trim().is_empty());

        match (text, image) {
            (Some(text), None) => Ok(ReportInput::Text(text.to_string())),
            (None, Some(image)) => Ok(ReportInput::Image(image.to_string())),
            (Some(_), Some(_)) => Err(AnalysisError::ConflictingInput),
            (None, None) => Err(AnalysisError::MissingInput),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ReportInput::Text(_) => "text",
            ReportInput::Image(_) => "image",
        }
    }
}

/// Turns a raw medical report into a [`SimplifiedReport`]
#[derive(Clone)]
pub struct ReportAnalyzer {
    model: Arc<dyn GenerativeModel>,
}

impl ReportAnalyzer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Analyze pasted text or an uploaded image.
    ///
    /// Anything that goes wrong after input validation (transport failure,
    /// empty payload, malformed payload) collapses into
    /// [`AnalysisError::Failed`]; the cause is only logged.
    pub async fn analyze(
        &self,
        text: Option<&str>,
        image: Option<&str>,
    ) -> Result<SimplifiedReport, AnalysisError> {
        let input = ReportInput::from_parts(text, image)?;
        self.analyze_input(input).await
    }

    pub async fn analyze_input(
        &self,
        input: ReportInput,
    ) -> Result<SimplifiedReport, AnalysisError> {
        info!(input = input.kind(), "Starting report analysis");

        let request = build_analysis_request(input);

        let response = self.model.generate_content(request).await.map_err(|e| {
            error!("Report analysis request failed: {}", e);
            AnalysisError::Failed
        })?;

        let payload = response.text().ok_or_else(|| {
            error!("Report analysis returned no textual payload");
            AnalysisError::Failed
        })?;

        let report = SimplifiedReport::from_model_output(&payload).map_err(|e| {
            error!("Report analysis returned malformed output: {}", e);
            AnalysisError::Failed
        })?;

        info!(
            key_points = report.key_points.len(),
            glossary_terms = report.glossary.len(),
            "Report analysis completed"
        );
        Ok(report)
    }
}

/// Image first, then text, then the fixed instruction
pub fn build_analysis_request(input: ReportInput) -> GenerateContentRequest {
    let mut parts = Vec::with_capacity(2);

    match input {
        ReportInput::Image(upload) => parts.push(InlineImage::from_upload(&upload).into_part()),
        ReportInput::Text(text) => parts.push(Part::text(text)),
    }
    parts.push(Part::text(ANALYSIS_PROMPT));

    GenerateContentRequest {
        contents: vec![Content::user(parts)],
        system_instruction: Some(Content::system(ANALYSIS_SYSTEM_INSTRUCTION)),
        generation_config: GenerationConfig::structured(report_response_schema()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::GenerateContentResponse,
        report::GlossaryItem,
        test_support::{ScriptedModel, canned_report, canned_report_json},
    };

    #[test]
    fn test_input_requires_exactly_one_source() {
        assert_eq!(
            ReportInput::from_parts(Some("blood work"), None).unwrap(),
            ReportInput::Text("blood work".to_string())
        );
        assert_eq!(
            ReportInput::from_parts(Some("   "), Some("AAAA")).unwrap(),
            ReportInput::Image("AAAA".to_string())
        );
        assert!(matches!(
            ReportInput::from_parts(None, Some("")),
            Err(AnalysisError::MissingInput)
        ));
        assert!(matches!(
            ReportInput::from_parts(Some("text"), Some("AAAA")),
            Err(AnalysisError::ConflictingInput)
        ));
    }

    #[test]
    fn test_request_shape_for_text() {
        let request = build_analysis_request(ReportInput::Text("Hb 9.1 g/dL".to_string()));

        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].as_text(), Some("Hb 9.1 g/dL"));
        assert_eq!(parts[1].as_text(), Some(ANALYSIS_PROMPT));

        let system = request.system_instruction.as_ref().unwrap();
        let instruction = system.parts[0].as_text().unwrap();
        assert!(instruction.contains("Reassuring, calm, and objective"));
        assert!(instruction.contains("Do not output any PII"));
        assert!(instruction.contains("Do not invent information"));

        assert_eq!(request.generation_config.response_mime_type, "application/json");
        assert_eq!(
            request.generation_config.response_schema,
            report_response_schema()
        );
    }

    #[test]
    fn test_request_strips_image_prefix() {
        let request = build_analysis_request(ReportInput::Image(
            "data:image/jpeg;base64,/9j/4AAQSkZJRg==".to_string(),
        ));

        let parts = &request.contents[0].parts;
        assert_eq!(parts[0], Part::inline_data("image/jpeg", "/9j/4AAQSkZJRg=="));
        assert_eq!(parts[1].as_text(), Some(ANALYSIS_PROMPT));
    }

    #[tokio::test]
    async fn test_analyze_returns_canned_report() {
        let model = Arc::new(ScriptedModel::new().respond_text(canned_report_json()));
        let analyzer = ReportAnalyzer::new(model.clone());

        let report = analyzer.analyze(Some("CBC panel"), None).await.unwrap();

        assert_eq!(report, canned_report());
        assert_eq!(
            report.glossary,
            vec![GlossaryItem {
                term: "T".to_string(),
                definition: "D".to_string()
            }]
        );
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_analyze_sends_prefix_free_image() {
        let model = Arc::new(ScriptedModel::new().respond_text(canned_report_json()));
        let analyzer = ReportAnalyzer::new(model.clone());

        analyzer
            .analyze(None, Some("data:image/png;base64,iVBORw0KGgoAAAANSUhEUg=="))
            .await
            .unwrap();

        let request = model.last_request().unwrap();
        assert_eq!(
            request.contents[0].parts[0],
            Part::inline_data("image/png", "iVBORw0KGgoAAAANSUhEUg==")
        );
    }

    #[tokio::test]
    async fn test_empty_payload_fails_generically() {
        let model = Arc::new(ScriptedModel::new().respond(GenerateContentResponse::default()));
        let analyzer = ReportAnalyzer::new(model);

        let err = analyzer.analyze(Some("report"), None).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Failed));
        assert_eq!(
            err.to_string(),
            "Failed to analyze the report. Please try again or check your input."
        );
    }

    #[tokio::test]
    async fn test_malformed_payload_and_transport_failure_look_the_same() {
        let model = Arc::new(
            ScriptedModel::new()
                .respond_text(r#"{"summary": "only a summary"}"#)
                .fail_with_status(503, "upstream secret detail"),
        );
        let analyzer = ReportAnalyzer::new(model);

        let malformed = analyzer.analyze(Some("report"), None).await.unwrap_err();
        let transport = analyzer.analyze(Some("report"), None).await.unwrap_err();

        assert_eq!(malformed.to_string(), transport.to_string());
        assert!(!transport.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_invalid_input_skips_remote_call() {
        let model = Arc::new(ScriptedModel::new());
        let analyzer = ReportAnalyzer::new(model.clone());

        let err = analyzer.analyze(None, None).await.unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(model.call_count(), 0);
    }
}
