//! Page modules
//!
//! Each page's behaviour is a statically linked [`PageModule`] registered
//! under the page id. The controller calls its hooks at fixed lifecycle
//! milestones.

use crate::settings::SettingsStore;
use pageloader_dom::{DomError, Document, EventTarget, Listener, ListenerTracker, NodeId};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Lifecycle hooks of a page. Every hook defaults to doing nothing.
pub trait PageModule {
    /// Once, right after the page is preloaded at boot
    fn load_once(&mut self, _cx: &mut PageContext<'_>) {}

    /// Once, the first time the page is shown and its markup localized
    fn load_once_view(&mut self, _cx: &mut PageContext<'_>) {}

    /// Once per language change, the first time the page is shown after it
    fn once_view_after_update(&mut self, _cx: &mut PageContext<'_>) {}

    /// Every activation; re-binds listeners and refreshes live data
    fn load(&mut self, _cx: &mut PageContext<'_>) {}
}

/// Module for pages without behaviour of their own
#[derive(Debug, Default)]
pub struct StaticPage;

impl PageModule for StaticPage {}

/// What a hook can reach
pub struct PageContext<'a> {
    pub page_id: &'a str,
    /// The page's container element
    pub container: NodeId,
    pub document: &'a mut Document,
    pub listeners: &'a mut ListenerTracker,
    pub settings: &'a mut dyn SettingsStore,
    pub navigator: &'a Navigator,
}

impl PageContext<'_> {
    /// Track a listener on the element with `id`
    pub fn on(&mut self, id: &str, event_type: &str, listener: Listener) -> Result<(), DomError> {
        let node = self
            .document
            .get_element_by_id(id)
            .ok_or_else(|| DomError::NoSuchId(id.to_string()))?;
        self.listeners
            .add_listener(self.document, EventTarget::Node(node), event_type, listener)
    }

    /// Track a listener on the window
    pub fn on_window(&mut self, event_type: &str, listener: Listener) -> Result<(), DomError> {
        self.listeners
            .add_listener(self.document, EventTarget::Window, event_type, listener)
    }
}

/// Static dispatch table from page id to module
#[derive(Default)]
pub struct PageRegistry {
    modules: HashMap<String, Box<dyn PageModule>>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the module for `page_id`, replacing any previous one
    pub fn register(&mut self, page_id: &str, module: impl PageModule + 'static) -> &mut Self {
        self.modules.insert(page_id.to_string(), Box::new(module));
        self
    }

    pub fn contains(&self, page_id: &str) -> bool {
        self.modules.contains_key(page_id)
    }

    pub(crate) fn get_mut(&mut self, page_id: &str) -> Option<&mut (dyn PageModule + 'static)> {
        self.modules.get_mut(page_id).map(|m| m.as_mut())
    }
}

/// Deferred navigation work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavRequest {
    /// Activate a page
    Switch(String),
    /// Persist a language choice and re-arm localization
    SetLanguage(String),
    /// Re-fetch and re-localize the active page
    Reload,
}

/// Queue of navigation requested from hooks and listener callbacks.
///
/// Requests never run while a switch is in progress; the controller drains
/// them once the current transition has finished.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    queue: Rc<RefCell<VecDeque<NavRequest>>>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self, request: NavRequest) {
        self.queue.borrow_mut().push_back(request);
    }

    /// Shorthand for [`NavRequest::Switch`]
    pub fn switch_to(&self, page_id: &str) {
        self.request(NavRequest::Switch(page_id.to_string()));
    }

    pub(crate) fn pop(&self) -> Option<NavRequest> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigator_fifo_across_clones() {
        let nav = Navigator::new();
        let handle = nav.clone();
        handle.switch_to("settings");
        nav.request(NavRequest::Reload);

        assert_eq!(nav.pending(), 2);
        assert_eq!(nav.pop(), Some(NavRequest::Switch("settings".to_string())));
        assert_eq!(handle.pop(), Some(NavRequest::Reload));
        assert_eq!(nav.pop(), None);
    }

    #[test]
    fn test_registry() {
        let mut registry = PageRegistry::new();
        registry.register("home", StaticPage);
        assert!(registry.contains("home"));
        assert!(registry.get_mut("home").is_some());
        assert!(registry.get_mut("modules").is_none());
    }
}
