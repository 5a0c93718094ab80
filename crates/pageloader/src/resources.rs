//! Resource fetching
//!
//! Page artifacts and language bundles are fetched by webroot-relative
//! path. Every fetch is a suspension point.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;

/// Fetch error
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid language bundle {path}: {source}")]
    Bundle {
        path: String,
        source: pageloader_i18n::TemplateError,
    },
}

/// Source of page resources
pub trait ResourceProvider {
    /// Fetch a text resource
    fn fetch_text(&self, path: &str) -> impl Future<Output = Result<String, FetchError>>;
}

/// Resources read from a directory on disk
#[derive(Debug, Clone)]
pub struct FsResources {
    root: PathBuf,
}

impl FsResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceProvider for FsResources {
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let full = self.root.join(path);
        tracing::trace!("Fetching {}", full.display());
        smol::fs::read_to_string(&full).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(path.to_string())
            } else {
                FetchError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        })
    }
}

/// In-memory resources, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryResources {
    files: HashMap<String, String>,
}

impl MemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a resource
    pub fn insert(&mut self, path: &str, content: &str) -> &mut Self {
        self.files.insert(path.to_string(), content.to_string());
        self
    }

    /// Drop a resource so fetching it fails
    pub fn remove(&mut self, path: &str) {
        self.files.remove(path);
    }
}

impl ResourceProvider for MemoryResources {
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        // Yield like a real fetch would
        smol::future::yield_now().await;
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}
