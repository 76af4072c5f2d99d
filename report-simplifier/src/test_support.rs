use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;

use crate::{
    error::ModelError,
    model::{GenerateContentRequest, GenerateContentResponse, GenerativeModel},
    report::{GlossaryItem, SimplifiedReport},
};

/// Model double that replays scripted outcomes in order and records requests
#[derive(Default)]
pub struct ScriptedModel {
    outcomes: Mutex<VecDeque<Result<GenerateContentResponse, ModelError>>>,
    requests: Mutex<Vec<GenerateContentRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: GenerateContentResponse) -> Self {
        lock(&self.outcomes).push_back(Ok(response));
        self
    }

    pub fn respond_text(self, text: impl Into<String>) -> Self {
        self.respond(GenerateContentResponse::from_text(text))
    }

    pub fn fail_with_status(self, status: u16, body: &str) -> Self {
        lock(&self.outcomes).push_back(Err(ModelError::Status {
            status,
            body: body.to_string(),
        }));
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn last_request(&self) -> Option<GenerateContentRequest> {
        lock(&self.requests).last().cloned()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ModelError> {
        lock(&self.requests).push(request);
        lock(&self.outcomes)
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Decode("no scripted response left".to_string())))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

pub fn canned_report() -> SimplifiedReport {
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

pub fn canned_report_json() -> String {
    r#"{"summary":"S","keyPoints":["A","B"],"glossary":[{"term":"T","definition":"D"}],"disclaimer":"Disc"}"#
        .to_string()
}

pub fn translated_report() -> SimplifiedReport {
    SimplifiedReport {
        summary: "S-hi".to_string(),
        key_points: vec!["A-hi".to_string(), "B-hi".to_string()],
        glossary: vec![GlossaryItem {
            term: "T-hi".to_string(),
            definition: "D-hi".to_string(),
        }],
        disclaimer: "Disc-hi".to_string(),
    }
}

pub fn translated_report_json() -> String {
    r#"{"summary":"S-hi","keyPoints":["A-hi","B-hi"],"glossary":[{"term":"T-hi","definition":"D-hi"}],"disclaimer":"Disc-hi"}"#
        .to_string()
}
