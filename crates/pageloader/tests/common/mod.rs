//! Shared fixture: two main pages and one settings mini page served from
//! memory, a navigation bar, a bridge that records UI calls and modules
//! that log their hooks.

#![allow(dead_code)]

use pageloader::dom::{Document, Listener};
use pageloader::{
    BridgeError, ExecOptions, ExecOutput, HostBridge, LoaderConfig, MemoryResources, MemoryStore,
    PageContext, PageController, PageDescriptor, PageModule, PageRegistry,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub type Controller = PageController<MemoryResources, RecordingBridge, MemoryStore>;
pub type HookLog = Rc<RefCell<Vec<String>>>;

pub const HOME_MARKUP: &str = r#"<h1 id="title" class="big">{{title}}</h1><input id="toggle" class="switch" type="checkbox" checked><button id="go">{{go}}</button>"#;
pub const SETTINGS_MARKUP: &str = r#"<h1 id="title">{{title}}</h1><p id="lang">{{language.label}}</p>"#;
pub const THEME_MARKUP: &str = r#"<h2 id="title">{{title}}</h2><p id="accent">{{accent}}</p>"#;

pub const MINI_THEME: &str = "mini_settings_theme";
pub const NAV_PAGES: [&str; 3] = ["home", "settings", MINI_THEME];

pub const EN_US: &str = r#"{
    "langName": "English",
    "pages": {
        "home": { "title": "Home", "go": "Go" },
        "settings": { "title": "Settings", "language": { "label": "Language" } },
        "mini_settings_theme": { "title": "Theme", "accent": "Accent color" }
    },
    "globals": {}
}"#;

pub const PT_BR: &str = r#"{
    "langName": "Português",
    "pages": {
        "home": { "title": "Início", "go": "Ir" },
        "settings": { "title": "Configurações", "language": { "label": "Idioma" } },
        "mini_settings_theme": { "title": "Tema", "accent": "Cor de destaque" }
    },
    "globals": {}
}"#;

#[derive(Debug, Default)]
pub struct RecordingBridge {
    pub toasts: RefCell<Vec<String>>,
    pub full_screen: Cell<Option<bool>>,
}

impl HostBridge for RecordingBridge {
    async fn exec(&self, _command: &str, _options: &ExecOptions) -> Result<ExecOutput, BridgeError> {
        Ok(ExecOutput {
            errno: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }

    fn full_screen(&self, enabled: bool) {
        self.full_screen.set(Some(enabled));
    }

    fn toast(&self, message: &str) {
        self.toasts.borrow_mut().push(message.to_string());
    }
}

/// Logs every hook as `page:hook`. Its `load` hook tracks a click listener
/// on `go` (when the page has one) that asks for the settings page.
pub struct RecordingModule {
    log: HookLog,
}

impl RecordingModule {
    fn push(&self, cx: &PageContext<'_>, hook: &str) {
        self.log.borrow_mut().push(format!("{}:{}", cx.page_id, hook));
    }
}

impl PageModule for RecordingModule {
    fn load_once(&mut self, cx: &mut PageContext<'_>) {
        self.push(cx, "load_once");
    }

    fn load_once_view(&mut self, cx: &mut PageContext<'_>) {
        self.push(cx, "load_once_view");
    }

    fn once_view_after_update(&mut self, cx: &mut PageContext<'_>) {
        self.push(cx, "once_view_after_update");
    }

    fn load(&mut self, cx: &mut PageContext<'_>) {
        self.push(cx, "load");
        if cx.page_id == "home" {
            let navigator = cx.navigator.clone();
            cx.on("go", "click", Listener::new(move |_| navigator.switch_to("settings")))
                .unwrap();
        }
    }
}

pub fn config() -> LoaderConfig {
    LoaderConfig {
        pages: vec![
            PageDescriptor::main("home"),
            PageDescriptor::main("settings"),
            PageDescriptor::mini("settings", "theme"),
        ],
        ..LoaderConfig::default()
    }
}

pub fn resources() -> MemoryResources {
    let mut resources = MemoryResources::new();
    resources
        .insert("js/pages/home/index.html", HOME_MARKUP)
        .insert("js/pages/home/index.css", "h1 { color: red; }")
        .insert("js/pages/home/pageScripts", "js/pages/home/extra.js\n")
        .insert("js/pages/settings/index.html", SETTINGS_MARKUP)
        .insert("js/pages/settings/index.css", "p { margin: 0; }")
        .insert("js/pages/settings/pageScripts", "")
        .insert("js/pages/settings/minipage/theme/index.html", THEME_MARKUP)
        .insert("js/pages/settings/minipage/theme/index.css", "h2 { font-size: 1rem; }")
        .insert("js/pages/settings/minipage/theme/pageScripts", "")
        .insert("lang/en_US.json", EN_US)
        .insert("lang/pt_BR.json", PT_BR);
    resources
}

pub fn registry(log: &HookLog) -> PageRegistry {
    let mut registry = PageRegistry::new();
    for page in NAV_PAGES {
        registry.register(page, RecordingModule { log: log.clone() });
    }
    registry
}

/// Document holding the navigation bar: a radio `n_*`, an indicator
/// `nibg_*` and an icon `ni_*` per page
pub fn document_with_nav() -> Document {
    let mut doc = Document::new();
    let body = doc.body();
    let nav = doc.append_element(body, "nav", Some("navbar"));
    for page in NAV_PAGES {
        doc.append_element(nav, "input", Some(&format!("n_{page}")));
        doc.append_element(nav, "div", Some(&format!("nibg_{page}")));
        doc.append_element(nav, "div", Some(&format!("ni_{page}")));
    }
    doc
}

pub fn controller_with(resources: MemoryResources, store: MemoryStore) -> (Controller, HookLog) {
    let log = HookLog::default();
    let controller = PageController::with_document(
        config(),
        registry(&log),
        resources,
        RecordingBridge::default(),
        store,
        document_with_nav(),
    );
    (controller, log)
}

pub fn controller() -> (Controller, HookLog) {
    controller_with(resources(), MemoryStore::new())
}

/// Hooks logged for `page`, in order
pub fn hooks_for(log: &HookLog, page: &str) -> Vec<String> {
    let prefix = format!("{page}:");
    log.borrow()
        .iter()
        .filter_map(|entry| entry.strip_prefix(&prefix).map(str::to_string))
        .collect()
}

/// Nav entries currently carrying `checked`
pub fn checked_nav_entries(controller: &Controller) -> Vec<String> {
    let doc = controller.document();
    NAV_PAGES
        .iter()
        .map(|page| format!("n_{page}"))
        .filter(|id| {
            doc.get_element_by_id(id)
                .and_then(|node| doc.tree().element(node).ok())
                .is_some_and(|elem| elem.has_attr("checked"))
        })
        .collect()
}

/// Attribute `name` of the live element with `id`
pub fn attr_of(controller: &Controller, id: &str, name: &str) -> Option<String> {
    let node = controller.document().get_element_by_id(id)?;
    let elem = controller.document().tree().element(node).ok()?;
    elem.get_attr(name).map(str::to_string)
}

/// Text of the live element with `id`
pub fn text_of(controller: &Controller, id: &str) -> Option<String> {
    let node = controller.document().get_element_by_id(id)?;
    Some(controller.document().tree().text_content(node))
}
