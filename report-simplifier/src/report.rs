use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SchemaError;

/// A medical term and its plain-language explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryItem {
    pub term: String,
    pub definition: String,
}

/// Layperson-readable rendition of a medical report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedReport {
    pub summary: String,
    pub key_points: Vec<String>,
    pub glossary: Vec<GlossaryItem>,
    pub disclaimer: String,
}

impl SimplifiedReport {
    /// Decode the model's textual payload into a report.
    ///
    /// All four fields must be present and non-null; `keyPoints` and
    /// `glossary` may be empty. The model is asked to honor the response
    /// schema, but its output is still treated as untrusted input here.
    pub fn from_model_output(payload: &str) -> Result<Self, SchemaError> {
        let report: SimplifiedReport = serde_json::from_str(payload.trim())?;

        if report.summary.trim().is_empty() {
            warn!("Model returned a report with an empty summary");
        }
        if report.disclaimer.trim().is_empty() {
            warn!("Model returned a report with an empty disclaimer");
        }

        Ok(report)
    }

    /// Plain-text rendering used for copying the report elsewhere
    pub fn to_plain_text(&self) -> String {
        let key_points = self
            .key_points
            .iter()
            .map(|point| format!("- {}", point))
            .collect::<Vec<_>>()
            .join("\n");

        let glossary = self
            .glossary
            .iter()
            .map(|item| format!("{}: {}", item.term, item.definition))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Summary:\n{}\n\nKey Points:\n{}\n\nGlossary:\n{}",
            self.summary, key_points, glossary
        )
        .trim()
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canned() -> SimplifiedReport {
        SimplifiedReport {
            summary: "S".to_string(),
            key_points: vec!["A".to_string(), "B".to_string()],
            glossary: vec![GlossaryItem {
                term: "T".to_string(),
                definition: "D".to_string(),
            }],
            disclaimer: "Disc".to_string(),
        }
    }

    #[test]
    fn test_decodes_camel_case_payload() {
        let payload = r#"{
            "summary": "S",
            "keyPoints": ["A", "B"],
            "glossary": [{"term": "T", "definition": "D"}],
            "disclaimer": "Disc"
        }"#;

        let report = SimplifiedReport::from_model_output(payload).unwrap();
        assert_eq!(report, canned());
    }

    #[test]
    fn test_empty_sequences_are_valid() {
        let payload = r#"{"summary":"S","keyPoints":[],"glossary":[],"disclaimer":"Disc"}"#;
        let report = SimplifiedReport::from_model_output(payload).unwrap();
        assert!(report.key_points.is_empty());
        assert!(report.glossary.is_empty());
    }

    #[test]
    fn test_missing_sequence_is_rejected() {
        let payload = r#"{"summary":"S","glossary":[],"disclaimer":"Disc"}"#;
        assert!(SimplifiedReport::from_model_output(payload).is_err());
    }

    #[test]
    fn test_null_field_is_rejected() {
        let payload = r#"{"summary":null,"keyPoints":[],"glossary":[],"disclaimer":"Disc"}"#;
        assert!(SimplifiedReport::from_model_output(payload).is_err());
    }

    #[test]
    fn test_glossary_item_shape_is_checked() {
        let payload =
            r#"{"summary":"S","keyPoints":[],"glossary":[{"term":"T"}],"disclaimer":"Disc"}"#;
        assert!(SimplifiedReport::from_model_output(payload).is_err());
    }

    #[test]
    fn test_non_json_is_rejected() {
        assert!(SimplifiedReport::from_model_output("Here is your summary!").is_err());
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(canned()).unwrap();
        assert!(value.get("keyPoints").is_some());
        assert!(value.get("key_points").is_none());
    }

    #[test]
    fn test_plain_text_rendering() {
        let text = canned().to_plain_text();
        assert_eq!(text, "Summary:\nS\n\nKey Points:\n- A\n- B\n\nGlossary:\nT: D");
    }
}
