use chrono::{DateTime, Utc};
use report_simplifier::{LanguageState, ReportSession, SimplifiedReport};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeReportRequest {
    #[serde(default)]
    pub text: Option<String>,
    /// Base64 image, optionally as a data URI
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SelectLanguageRequest {
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    pub report_id: String,
    pub language: String,
    pub language_state: LanguageState,
    pub report: SimplifiedReport,
    pub created_at: DateTime<Utc>,
}

impl From<&ReportSession> for ReportResponse {
    fn from(session: &ReportSession) -> Self {
        Self {
            report_id: session.id.clone(),
            language: session.view.language().to_string(),
            language_state: session.view.state().clone(),
            report: session.view.displayed().clone(),
            created_at: session.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguagesResponse {
    pub base_language: String,
    pub languages: Vec<String>,
}
