use axum::{
    Router,
    extract::{DefaultBodyLimit, Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
};
use report_simplifier::{
    BASE_LANGUAGE, GeminiClient, GenerativeModel, InMemoryReportStorage, ReportAnalyzer,
    ReportSession, ReportStorage, ReportTranslator, Settings, StorageError,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::models::{
    AnalyzeReportRequest, LanguagesResponse, ReportResponse, SelectLanguageRequest,
};

/// Request body cap; an image upload may be 5 MB before base64 encoding
pub const MAX_REQUEST_BYTES: usize = 8 * 1024 * 1024;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "report_id": id
        })),
    )
}

fn upstream_error(message: &str) -> ApiError {
    (StatusCode::BAD_GATEWAY, Json(json!({ "error": message })))
}

fn storage_error(e: StorageError) -> ApiError {
    error!("Report storage failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Report storage is unavailable" })),
    )
}

/// Malformed or oversized bodies get the same JSON error shape as the handlers
fn body_error(rejection: JsonRejection) -> ApiError {
    (
        rejection.status(),
        Json(json!({ "error": rejection.body_text() })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub analyzer: ReportAnalyzer,
    pub translator: ReportTranslator,
    pub report_storage: Arc<dyn ReportStorage>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// One model client shared by both operations
    pub fn new(settings: Settings, model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            analyzer: ReportAnalyzer::new(model.clone()),
            translator: ReportTranslator::new(model),
            report_storage: Arc::new(InMemoryReportStorage::with_limits(
                settings.storage_limits(),
            )),
            settings: Arc::new(settings),
        }
    }
}

pub fn create_app(settings: Settings) -> Router {
    let model: Arc<dyn GenerativeModel> = Arc::new(GeminiClient::from_settings(&settings));
    info!(model = %settings.model, "Using generative model");
    build_router(AppState::new(settings, model))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/languages", get(list_languages))
        .route("/reports/analyze", post(analyze_report))
        .route("/reports/{report_id}", get(get_report).delete(delete_report))
        .route("/reports/{report_id}/text", get(get_report_text))
        .route("/reports/{report_id}/language", put(select_language))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Medical Report Simplifier",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Plain-language explanations of medical reports, with translation",
        "endpoints": {
            "POST /reports/analyze": "Analyze report text or an image",
            "GET /reports/{report_id}": "Get the displayed report",
            "GET /reports/{report_id}/text": "Get the displayed report as plain text",
            "PUT /reports/{report_id}/language": "Switch the report language",
            "DELETE /reports/{report_id}": "Discard a report",
            "GET /languages": "Supported languages",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn list_languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        base_language: BASE_LANGUAGE.to_string(),
        languages: state.settings.languages(),
    })
}

async fn analyze_report(
    State(state): State<AppState>,
    request: Result<Json<AnalyzeReportRequest>, JsonRejection>,
) -> ApiResult<ReportResponse> {
    let Json(request) = request.map_err(body_error)?;
    let report = state
        .analyzer
        .analyze(request.text.as_deref(), request.image.as_deref())
        .await
        .map_err(|e| {
            if e.is_invalid_input() {
                bad_request_error(&e.to_string())
            } else {
                upstream_error(&e.to_string())
            }
        })?;

    let session = ReportSession::new(report, state.settings.cache_translations);
    info!(report_id = %session.id, "Report analyzed");

    let response = ReportResponse::from(&session);
    state
        .report_storage
        .save(session)
        .await
        .map_err(storage_error)?;
    Ok(Json(response))
}

async fn load_session(state: &AppState, report_id: &str) -> Result<ReportSession, ApiError> {
    state
        .report_storage
        .get(report_id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| not_found_error("Report not found", report_id))
}

async fn get_report(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> ApiResult<ReportResponse> {
    let session = load_session(&state, &report_id).await?;
    Ok(Json(ReportResponse::from(&session)))
}

async fn get_report_text(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> Result<String, ApiError> {
    let session = load_session(&state, &report_id).await?;
    Ok(session.view.displayed().to_plain_text())
}

async fn select_language(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
    request: Result<Json<SelectLanguageRequest>, JsonRejection>,
) -> ApiResult<ReportResponse> {
    let Json(request) = request.map_err(body_error)?;
    let language = request.language.trim();
    if language.is_empty() {
        return Err(bad_request_error("Language is required"));
    }
    if !state.settings.supports_language(language) {
        return Err(bad_request_error(&format!(
            "Unsupported language: {}",
            language
        )));
    }

    let mut session = load_session(&state, &report_id).await?;
    info!(report_id = %report_id, language = %language, "Switching report language");

    session
        .view
        .switch_language(&state.translator, language)
        .await;

    if !session.view.language().eq_ignore_ascii_case(language) {
        warn!(
            report_id = %report_id,
            language = %language,
            "Translation failed, reverted to base language"
        );
    }

    // The report may have been discarded while the translation was running
    let still_stored = state
        .report_storage
        .get(&report_id)
        .await
        .map_err(storage_error)?
        .is_some();
    if !still_stored {
        info!(report_id = %report_id, "Report discarded during translation");
        return Err(not_found_error("Report not found", &report_id));
    }

    let response = ReportResponse::from(&session);
    state
        .report_storage
        .save(session)
        .await
        .map_err(storage_error)?;
    Ok(Json(response))
}

async fn delete_report(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = state
        .report_storage
        .delete(&report_id)
        .await
        .map_err(storage_error)?;
    if deleted {
        info!(report_id = %report_id, "Report discarded");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found_error("Report not found", &report_id))
    }
}
