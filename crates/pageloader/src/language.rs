//! Language selection
//!
//! Choosing a language touches no markup. It only persists the choice and
//! re-arms every page so its next activation hot-reloads its strings.

use crate::settings::{keys, SettingsStore};
use crate::state::LoaderState;
use pageloader_dom::{DomError, Document};

/// Text direction of a language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

/// Owns the language choice
#[derive(Debug, Clone)]
pub struct LanguageCoordinator {
    default_language: String,
}

impl LanguageCoordinator {
    pub fn new(default_language: &str) -> Self {
        Self {
            default_language: default_language.to_string(),
        }
    }

    /// Persisted language, or the default
    pub fn current_language(&self, store: &dyn SettingsStore) -> String {
        store
            .get(keys::LANGUAGE)
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| self.default_language.clone())
    }

    /// Persist `lang` and mark every page as not localized for it
    pub fn set_language(&self, store: &mut dyn SettingsStore, state: &mut LoaderState, lang: &str) {
        store.set(keys::LANGUAGE, lang);
        state.invalidate_localization();
        tracing::info!("Language set to {}; pages re-localize on next view", lang);
    }

    /// Direction `lang` is written in
    pub fn text_direction(lang: &str) -> TextDirection {
        if lang.starts_with("ar_") {
            TextDirection::Rtl
        } else {
            TextDirection::Ltr
        }
    }

    /// Set `dir` on the root element
    pub fn apply_direction(doc: &mut Document, lang: &str) -> Result<(), DomError> {
        let html = doc.document_element();
        doc.tree_mut()
            .element_mut(html)?
            .set_attr("dir", Self::text_direction(lang).as_str());
        Ok(())
    }
}
