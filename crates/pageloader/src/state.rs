//! Loader state
//!
//! The one mutable state object threaded through every transition: what
//! each mounted page owns, its localization milestones and which page is
//! active.

use crate::config::PageDescriptor;
use pageloader_dom::NodeId;
use std::collections::HashMap;

/// Lifecycle position of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// Never mounted (or failed to preload)
    Unloaded,
    /// Mounted, namespaced and invisible
    Hidden,
    /// The single visible page
    Active,
}

/// A page mounted at boot. Never destroyed, only shown and hidden.
#[derive(Debug, Clone)]
pub struct MountedPage {
    pub descriptor: PageDescriptor,
    /// `{id}_content` container
    pub container: NodeId,
    /// `{id}_css` style element
    pub style: NodeId,
    /// `{id}_js` script elements
    pub scripts: Vec<NodeId>,
    pub status: PageStatus,
    /// Markup has been through its first localization pass
    pub view_loaded: bool,
    /// Markup matches the current language
    pub localized: bool,
}

impl MountedPage {
    pub fn new(descriptor: PageDescriptor, container: NodeId, style: NodeId, scripts: Vec<NodeId>) -> Self {
        Self {
            descriptor,
            container,
            style,
            scripts,
            status: PageStatus::Hidden,
            view_loaded: false,
            localized: false,
        }
    }
}

/// Everything the transitions mutate
#[derive(Debug, Default)]
pub struct LoaderState {
    pages: HashMap<String, MountedPage>,
    current: Option<String>,
}

impl LoaderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn mount(&mut self, page: MountedPage) {
        self.pages.insert(page.descriptor.id.clone(), page);
    }

    pub fn page(&self, id: &str) -> Option<&MountedPage> {
        self.pages.get(id)
    }

    pub(crate) fn page_mut(&mut self, id: &str) -> Option<&mut MountedPage> {
        self.pages.get_mut(id)
    }

    /// Status of `id`; pages that never mounted are `Unloaded`
    pub fn status(&self, id: &str) -> PageStatus {
        self.pages.get(id).map_or(PageStatus::Unloaded, |p| p.status)
    }

    /// The active page, if any
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub(crate) fn set_current(&mut self, id: Option<String>) {
        self.current = id;
    }

    /// Number of mounted pages
    pub fn mounted(&self) -> usize {
        self.pages.len()
    }

    /// Forget that any page is localized for the current language
    pub(crate) fn invalidate_localization(&mut self) {
        for page in self.pages.values_mut() {
            page.localized = false;
        }
    }
}
