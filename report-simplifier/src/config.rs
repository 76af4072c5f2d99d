use std::str::FromStr;

use chrono::Duration;

use crate::{
    error::ConfigError,
    model::{DEFAULT_BASE_URL, DEFAULT_MODEL},
    storage::{DEFAULT_MAX_REPORTS, DEFAULT_REPORT_TTL_SECS, StorageLimits},
    view::BASE_LANGUAGE,
};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TRANSLATION_LANGUAGES: [&str; 3] = ["Hindi", "Kannada", "Tamil"];

/// Runtime settings, read once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub port: u16,
    /// Languages a report may be translated into, besides the base language
    pub translation_languages: Vec<String>,
    pub cache_translations: bool,
    /// Seconds an analyzed report is kept before it is discarded
    pub report_ttl_secs: i64,
    pub max_reports: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = var("GEMINI_API_KEY")
            .or_else(|| var("API_KEY"))
            .ok_or(ConfigError::MissingApiKey)?;

        let port = parse_number(var("PORT"), "PORT", DEFAULT_PORT)?;
        let report_ttl_secs =
            parse_number(var("REPORT_TTL_SECS"), "REPORT_TTL_SECS", DEFAULT_REPORT_TTL_SECS)?;
        let max_reports = parse_number(var("MAX_REPORTS"), "MAX_REPORTS", DEFAULT_MAX_REPORTS)?;

        if report_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "REPORT_TTL_SECS",
                value: report_ttl_secs.to_string(),
            });
        }
        if max_reports == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_REPORTS",
                value: max_reports.to_string(),
            });
        }

        let translation_languages = match var("TRANSLATION_LANGUAGES") {
            Some(value) => parse_language_list(&value),
            None => DEFAULT_TRANSLATION_LANGUAGES
                .iter()
                .map(|lang| lang.to_string())
                .collect(),
        };

        let cache_translations = match var("CACHE_TRANSLATIONS") {
            Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidValue {
                name: "CACHE_TRANSLATIONS",
                value,
            })?,
            None => false,
        };

        Ok(Self {
            api_key,
            model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: var("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            port,
            translation_languages,
            cache_translations,
            report_ttl_secs,
            max_reports,
        })
    }

    pub fn storage_limits(&self) -> StorageLimits {
        StorageLimits {
            ttl: Duration::seconds(self.report_ttl_secs),
            max_sessions: self.max_reports,
        }
    }

    /// Base language first, then the translation targets
    pub fn languages(&self) -> Vec<String> {
        std::iter::once(BASE_LANGUAGE.to_string())
            .chain(self.translation_languages.iter().cloned())
            .collect()
    }

    pub fn supports_language(&self, language: &str) -> bool {
        let language = language.trim();
        self.languages()
            .iter()
            .any(|known| known.eq_ignore_ascii_case(language))
    }
}

fn parse_number<T: FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

fn parse_language_list(value: &str) -> Vec<String> {
    let mut languages: Vec<String> = Vec::new();
    for lang in value.split(',').map(str::trim).filter(|l| !l.is_empty()) {
        let duplicate = lang.eq_ignore_ascii_case(BASE_LANGUAGE)
            || languages.iter().any(|known| known.eq_ignore_ascii_case(lang));
        if !duplicate {
            languages.push(lang.to_string());
        }
    }
    languages
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
