//! Navigation bar
//!
//! The bar lives outside every page container, so its ids are never
//! namespaced and its listeners are never tracked.

use crate::module::Navigator;
use pageloader_dom::{Document, ElementData, EventTarget, Listener};
use pageloader_i18n::PageStrings;

/// Reflects the active page in the nav UI
#[derive(Debug, Clone)]
pub struct NavigationBar {
    main_pages: Vec<String>,
    mini_pages: Vec<String>,
}

impl NavigationBar {
    pub fn new(main_pages: Vec<String>, mini_pages: Vec<String>) -> Self {
        Self { main_pages, mini_pages }
    }

    fn is_main(&self, page_id: &str) -> bool {
        self.main_pages.iter().any(|p| p == page_id)
    }

    /// Move the active indicator to `page_id`. Exactly one `n_{page}` entry
    /// stays checked across main and mini pages; the `nibg_`/`ni_` visuals
    /// only follow main pages.
    pub fn set_active(&self, doc: &mut Document, page_id: &str) {
        for page in self.main_pages.iter().chain(&self.mini_pages) {
            let active = page == page_id;
            if let Some(elem) = element_mut(doc, &format!("n_{page}")) {
                if active {
                    elem.set_attr("checked", "");
                } else {
                    elem.remove_attr("checked");
                }
            }
        }

        if !self.is_main(page_id) {
            return;
        }

        for page in &self.main_pages {
            let active = page == page_id;
            if let Some(elem) = element_mut(doc, &format!("nibg_{page}")) {
                let mut classes = elem.class_list();
                if active {
                    classes.add(&["show"]);
                } else {
                    classes.remove(&["show"]);
                }
                elem.set_class_list(&classes);
            }

            if let Some(elem) = element_mut(doc, &format!("ni_{page}")) {
                if active {
                    elem.set_attr("style", &format!("background-image: url(./assets/{page}/filled.svg)"));
                } else {
                    elem.remove_attr("style");
                }
            }
        }
    }

    /// Highlight the home entry before any switch completes
    pub fn mark_initial(&self, doc: &mut Document) {
        if let Some(elem) = element_mut(doc, "nibg_home") {
            let mut classes = elem.class_list();
            classes.add(&["show"]);
            elem.set_class_list(&classes);
        }
    }

    /// Write localized titles into the bar. Returns how many were set.
    pub fn localize(&self, doc: &mut Document, strings: &PageStrings) -> usize {
        let mut written = 0;
        for page in &self.main_pages {
            let Some(title) = strings.lookup(&format!("navbar.{page}")) else {
                continue;
            };
            let Some(node) = doc.get_element_by_id(&format!("nav_{page}_title")) else {
                continue;
            };
            if doc.set_text_content(node, &title).is_ok() {
                written += 1;
            }
        }
        written
    }

    /// Route clicks on `n_{page}` entries into the navigator
    pub fn bind(&self, doc: &mut Document, navigator: &Navigator) -> usize {
        let mut bound = 0;
        for page in self.main_pages.iter().chain(&self.mini_pages) {
            let Some(node) = doc.get_element_by_id(&format!("n_{page}")) else {
                continue;
            };
            let nav = navigator.clone();
            let target = page.clone();
            let listener = Listener::new(move |_| nav.switch_to(&target));
            if doc.add_event_listener(EventTarget::Node(node), "click", listener).is_ok() {
                bound += 1;
            }
        }
        tracing::debug!("Bound {} navbar entries", bound);
        bound
    }
}

fn element_mut<'a>(doc: &'a mut Document, id: &str) -> Option<&'a mut ElementData> {
    let node = doc.get_element_by_id(id)?;
    doc.tree_mut().element_mut(node).ok()
}
