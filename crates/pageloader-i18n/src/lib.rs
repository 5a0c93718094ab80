//! Page Loader i18n
//!
//! Language bundles and the two-phase placeholder templating used to
//! localize page markup: a first `solve` pass that records what every
//! `{{key}}` resolved to, and `hot_reload` passes that swap those values for
//! a new language without re-fetching the markup.

mod bundle;
mod template;

pub use bundle::{LanguageBundle, PageStrings};
pub use template::{PlaceholderBinding, TemplateEngine};

/// i18n error
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Malformed language bundle: {0}")]
    MalformedBundle(#[from] serde_json::Error),
}
