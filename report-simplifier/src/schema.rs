use serde_json::{Value, json};

/// Output schema handed to the model so it emits a `SimplifiedReport`.
///
/// Uses the OpenAPI subset understood by the Gemini `responseSchema` field.
pub fn report_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "keyPoints": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "glossary": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "term": { "type": "STRING" },
                        "definition": { "type": "STRING" }
                    },
                    "required": ["term", "definition"]
                }
            },
            "disclaimer": { "type": "STRING" }
        },
        "required": ["summary", "keyPoints", "glossary", "disclaimer"]
    })
}
