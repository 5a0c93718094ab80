//! Page Loader
//!
//! Mounts every UI page of a single-document web UI at boot and switches
//! between them without re-fetching: hidden pages keep their markup under
//! namespaced ids, their stylesheets disabled and their listeners detached.
//! Localized strings are solved once per page and hot reloaded lazily after
//! a language change.

pub mod bridge;
pub mod config;
mod controller;
pub mod language;
pub mod module;
pub mod navbar;
pub mod resources;
pub mod settings;
pub mod state;

pub use bridge::{BridgeError, ExecOptions, ExecOutput, HostBridge, OfflineBridge, ProcessBridge};
pub use config::{ConfigError, LoaderConfig, PageAsset, PageDescriptor, PageKind};
pub use controller::{PageController, SwitchOutcome};
pub use language::{LanguageCoordinator, TextDirection};
pub use module::{NavRequest, Navigator, PageContext, PageModule, PageRegistry, StaticPage};
pub use navbar::NavigationBar;
pub use resources::{FetchError, FsResources, MemoryResources, ResourceProvider};
pub use settings::{ErrorLog, JsonFileStore, MemoryStore, SettingsStore, UiConfig};
pub use state::{LoaderState, MountedPage, PageStatus};

pub use pageloader_dom as dom;
pub use pageloader_i18n as i18n;

/// Page loader error
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("DOM error: {0}")]
    Dom(#[from] pageloader_dom::DomError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("No module registered for page {0}")]
    MissingModule(String),
}
