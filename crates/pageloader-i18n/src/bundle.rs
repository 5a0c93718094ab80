//! Language bundles
//!
//! A bundle holds one section per page under `pages` and a `globals`
//! section shared by every page.

use crate::TemplateError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One language's strings, as shipped in `lang/{id}.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguageBundle {
    /// Human readable language name
    #[serde(rename = "langName", default, skip_serializing_if = "Option::is_none")]
    pub lang_name: Option<String>,
    #[serde(default)]
    pub pages: Map<String, Value>,
    #[serde(default)]
    pub globals: Map<String, Value>,
}

impl LanguageBundle {
    /// Parse a bundle from JSON text
    pub fn from_json(text: &str) -> Result<Self, TemplateError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Strings visible to `page_id`: its own section, then the globals
    /// (globals win on collisions), then a `navbar` section holding the
    /// `title` of every page in `nav_pages`.
    pub fn page_strings(&self, page_id: &str, nav_pages: &[&str]) -> PageStrings {
        let mut merged = Map::new();
        if let Some(Value::Object(section)) = self.pages.get(page_id) {
            merged.extend(section.clone());
        }
        merged.extend(self.globals.clone());

        let mut navbar = Map::new();
        for &nav in nav_pages {
            if let Some(title) = self.pages.get(nav).and_then(|p| p.get("title")) {
                navbar.insert(nav.to_string(), title.clone());
            }
        }
        merged.insert("navbar".to_string(), Value::Object(navbar));

        PageStrings(Value::Object(merged))
    }
}

/// Resolved strings for one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageStrings(pub Value);

impl PageStrings {
    /// Look up a dotted path (`a.b.c`) by sequential key lookup.
    ///
    /// Strings resolve verbatim, numbers and booleans to their JSON text.
    /// A missing segment, null, array or object leaves the path unresolved.
    pub fn lookup(&self, path: &str) -> Option<String> {
        let mut value = &self.0;
        for segment in path.split('.') {
            value = value.as_object()?.get(segment)?;
        }
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundle() -> LanguageBundle {
        LanguageBundle::from_json(
            r#"{
                "langName": "English",
                "pages": {
                    "home": { "title": "Home", "status": { "ok": "Working" }, "shared": "page" },
                    "settings": { "title": "Settings" }
                },
                "globals": { "shared": "global", "unknown": "Unknown" }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_page_strings_merge_order() {
        let strings = bundle().page_strings("home", &["home", "settings"]);
        assert_eq!(strings.lookup("title").as_deref(), Some("Home"));
        assert_eq!(strings.lookup("shared").as_deref(), Some("global"));
        assert_eq!(strings.lookup("unknown").as_deref(), Some("Unknown"));
        assert_eq!(strings.lookup("navbar.settings").as_deref(), Some("Settings"));
    }

    #[test]
    fn test_dotted_lookup() {
        let strings = bundle().page_strings("home", &[]);
        assert_eq!(strings.lookup("status.ok").as_deref(), Some("Working"));
        assert_eq!(strings.lookup("status.missing"), None);
        assert_eq!(strings.lookup("title.deeper"), None);
        assert_eq!(strings.lookup("status"), None);
    }

    #[test]
    fn test_scalar_rendering() {
        let strings = PageStrings(json!({ "count": 3, "flag": true, "nothing": null }));
        assert_eq!(strings.lookup("count").as_deref(), Some("3"));
        assert_eq!(strings.lookup("flag").as_deref(), Some("true"));
        assert_eq!(strings.lookup("nothing"), None);
    }

    #[test]
    fn test_unknown_page_gets_globals_only() {
        let strings = bundle().page_strings("mini_settings_theme", &[]);
        assert_eq!(strings.lookup("title"), None);
        assert_eq!(strings.lookup("shared").as_deref(), Some("global"));
    }

    #[test]
    fn test_missing_sections_default() {
        let bundle = LanguageBundle::from_json("{}").unwrap();
        assert!(bundle.pages.is_empty());
        assert!(bundle.lang_name.is_none());
    }

    #[test]
    fn test_malformed_bundle() {
        assert!(LanguageBundle::from_json("{ pages: ").is_err());
    }
}
