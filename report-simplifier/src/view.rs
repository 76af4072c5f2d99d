use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{report::SimplifiedReport, translator::ReportTranslator};

/// Language reports are originally produced in
pub const BASE_LANGUAGE: &str = "English";

pub fn is_base_language(language: &str) -> bool {
    language.trim().eq_ignore_ascii_case(BASE_LANGUAGE)
}

/// Translation state of a displayed report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "language", rename_all = "snake_case")]
pub enum LanguageState {
    Base,
    Translating(String),
    Translated(String),
}

/// Outcome of picking a language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSelection {
    /// Displayed report changed without a remote call
    Ready,
    /// A translation into this language must be fetched
    NeedsTranslation(String),
}

/// The original report of one analysis and whatever is shown in its place.
///
/// Original and translated reports are held side by side and swapped by
/// reference; a translation never modifies the original.
#[derive(Debug, Clone)]
pub struct ReportView {
    original: Arc<SimplifiedReport>,
    displayed: Arc<SimplifiedReport>,
    state: LanguageState,
    cache: Option<HashMap<String, Arc<SimplifiedReport>>>,
}

impl ReportView {
    pub fn new(original: SimplifiedReport) -> Self {
        let original = Arc::new(original);
        Self {
            displayed: original.clone(),
            original,
            state: LanguageState::Base,
            cache: None,
        }
    }

    /// Remember successful translations for this report
    pub fn with_translation_cache(mut self) -> Self {
        self.cache = Some(HashMap::new());
        self
    }

    pub fn original(&self) -> &SimplifiedReport {
        &self.original
    }

    pub fn displayed(&self) -> &SimplifiedReport {
        &self.displayed
    }

    pub fn state(&self) -> &LanguageState {
        &self.state
    }

    /// Language shown in the selector
    pub fn language(&self) -> &str {
        match &self.state {
            LanguageState::Base => BASE_LANGUAGE,
            LanguageState::Translating(lang) | LanguageState::Translated(lang) => lang,
        }
    }

    pub fn select_language(&mut self, language: &str) -> LanguageSelection {
        let language = language.trim();

        if is_base_language(language) {
            self.reset_to_base();
            return LanguageSelection::Ready;
        }

        if let Some(cached) = self.cached(language) {
            self.displayed = cached;
            self.state = LanguageState::Translated(language.to_string());
            return LanguageSelection::Ready;
        }

        self.state = LanguageState::Translating(language.to_string());
        LanguageSelection::NeedsTranslation(language.to_string())
    }

    /// Show `translated` if `language` is still the one being fetched.
    /// Returns whether it was applied.
    pub fn complete_translation(&mut self, language: &str, translated: SimplifiedReport) -> bool {
        let pending = matches!(&self.state, LanguageState::Translating(lang) if lang == language);
        if !pending {
            warn!(language = %language, "Dropping translation that is no longer pending");
            return false;
        }

        let translated = Arc::new(translated);
        if let Some(cache) = self.cache.as_mut() {
            cache.insert(language.to_lowercase(), translated.clone());
        }
        self.displayed = translated;
        self.state = LanguageState::Translated(language.to_string());
        true
    }

    /// Fall back to the original report and the base language
    pub fn fail_translation(&mut self) {
        self.reset_to_base();
    }

    /// Switch the displayed report to `language`, translating when needed.
    ///
    /// A failed translation is not an error for the caller: the view reverts
    /// to the original report in the base language.
    pub async fn switch_language(
        &mut self,
        translator: &ReportTranslator,
        language: &str,
    ) -> &SimplifiedReport {
        if let LanguageSelection::NeedsTranslation(language) = self.select_language(language) {
            match translator.translate(&self.original, &language).await {
                Ok(translated) => {
                    self.complete_translation(&language, translated);
                }
                Err(e) => {
                    warn!(
                        language = %language,
                        "Translation failed, showing original report: {}", e
                    );
                    self.fail_translation();
                }
            }
        }

        info!(language = %self.language(), "Report view language switched");
        self.displayed()
    }

    fn reset_to_base(&mut self) {
        self.displayed = self.original.clone();
        self.state = LanguageState::Base;
    }

    fn cached(&self, language: &str) -> Option<Arc<SimplifiedReport>> {
        self.cache.as_ref()?.get(&language.to_lowercase()).cloned()
    }
}
