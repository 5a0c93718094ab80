//! Loader configuration
//!
//! Which pages exist, where their resources live and which language and
//! page the loader starts with.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Page kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    /// Top-level page with a navigation entry
    Main,
    /// Secondary page scoped beneath a parent page
    Mini,
}

/// Static description of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDescriptor {
    pub id: String,
    pub kind: PageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Per-page artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAsset {
    Markup,
    Stylesheet,
    ScriptManifest,
}

impl PageAsset {
    fn file_name(self) -> &'static str {
        match self {
            PageAsset::Markup => "index.html",
            PageAsset::Stylesheet => "index.css",
            PageAsset::ScriptManifest => "pageScripts",
        }
    }
}

impl PageDescriptor {
    /// Main page
    pub fn main(id: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: PageKind::Main,
            parent_id: None,
        }
    }

    /// Mini page `child` under `parent`, identified as `mini_{parent}_{child}`
    pub fn mini(parent: &str, child: &str) -> Self {
        Self {
            id: format!("mini_{parent}_{child}"),
            kind: PageKind::Mini,
            parent_id: Some(parent.to_string()),
        }
    }

    pub fn is_mini(&self) -> bool {
        self.kind == PageKind::Mini
    }

    /// Directory holding the page's artifacts, relative to the webroot
    pub fn resource_dir(&self) -> String {
        match (&self.kind, &self.parent_id) {
            (PageKind::Mini, Some(parent)) => {
                let child = self
                    .id
                    .strip_prefix(&format!("mini_{parent}_"))
                    .unwrap_or(&self.id);
                format!("js/pages/{parent}/minipage/{child}")
            }
            _ => format!("js/pages/{}", self.id),
        }
    }

    /// Webroot-relative path of one artifact
    pub fn asset_path(&self, asset: PageAsset) -> String {
        format!("{}/{}", self.resource_dir(), asset.file_name())
    }
}

/// Loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderConfig {
    /// Directory resources are fetched from
    pub webroot: PathBuf,
    /// Language used until the user picks one
    pub default_language: String,
    /// Page activated after boot
    pub start_page: String,
    /// Every page, in preload order
    pub pages: Vec<PageDescriptor>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            webroot: PathBuf::from("webroot"),
            default_language: "en_US".to_string(),
            start_page: "home".to_string(),
            pages: vec![
                PageDescriptor::main("home"),
                PageDescriptor::main("modules"),
                PageDescriptor::main("actions"),
                PageDescriptor::main("settings"),
                PageDescriptor::mini("settings", "language"),
                PageDescriptor::mini("settings", "theme"),
            ],
        }
    }
}

impl LoaderConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Look up a page descriptor
    pub fn page(&self, id: &str) -> Option<&PageDescriptor> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// IDs of main pages, in order
    pub fn main_pages(&self) -> Vec<&str> {
        self.pages
            .iter()
            .filter(|p| !p.is_mini())
            .map(|p| p.id.as_str())
            .collect()
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_page_paths() {
        let page = PageDescriptor::main("home");
        assert_eq!(page.asset_path(PageAsset::Markup), "js/pages/home/index.html");
        assert_eq!(page.asset_path(PageAsset::ScriptManifest), "js/pages/home/pageScripts");
    }

    #[test]
    fn test_mini_page_paths() {
        let page = PageDescriptor::mini("settings", "language");
        assert_eq!(page.id, "mini_settings_language");
        assert_eq!(
            page.asset_path(PageAsset::Stylesheet),
            "js/pages/settings/minipage/language/index.css"
        );
    }

    #[test]
    fn test_default_pages() {
        let config = LoaderConfig::default();
        assert_eq!(config.main_pages(), vec!["home", "modules", "actions", "settings"]);
        assert!(config.page("mini_settings_theme").unwrap().is_mini());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LoaderConfig =
            serde_json::from_str(r#"{ "defaultLanguage": "pt_BR", "startPage": "settings" }"#).unwrap();
        assert_eq!(config.default_language, "pt_BR");
        assert_eq!(config.start_page, "settings");
        assert_eq!(config.pages.len(), 6);
    }

    #[test]
    fn test_webroot_from_json() {
        let config: LoaderConfig = serde_json::from_str(r#"{ "webroot": "/srv/webui" }"#).unwrap();
        assert_eq!(config.webroot, PathBuf::from("/srv/webui"));
        assert_eq!(LoaderConfig::default().webroot, PathBuf::from("webroot"));
    }

    #[test]
    fn test_descriptor_json() {
        let page: PageDescriptor =
            serde_json::from_str(r#"{ "id": "mini_a_b", "kind": "mini", "parentId": "a" }"#).unwrap();
        assert_eq!(page, PageDescriptor::mini("a", "b"));
    }
}
