//! Page controller
//!
//! Owns the document and drives every page through
//! `Unloaded -> Hidden -> Active <-> Hidden`. All pages are mounted at boot;
//! switching only moves names, stylesheets, listeners and visibility around
//! and runs the localization passes each page still owes.

use crate::bridge::HostBridge;
use crate::config::{LoaderConfig, PageAsset, PageDescriptor};
use crate::language::LanguageCoordinator;
use crate::module::{NavRequest, Navigator, PageContext, PageRegistry};
use crate::navbar::NavigationBar;
use crate::resources::{FetchError, ResourceProvider};
use crate::settings::{ErrorLog, SettingsStore, UiConfig};
use crate::state::{LoaderState, MountedPage, PageStatus};
use crate::LoaderError;
use pageloader_dom::{DomError, Document, ListenerTracker, Namespacer, NodeId};
use pageloader_i18n::{LanguageBundle, PageStrings, TemplateEngine};
use smol::future;

const PAGE_ROOT_ID: &str = "page_content";
const FONT_TAG_ID: &str = "font-tag";
const SYSTEM_FONT_RULE: &str = ":root { --font-family: system-ui, -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, \
Oxygen, Ubuntu, Cantarell, 'Open Sans', 'Helvetica Neue', sans-serif }";

/// Result of a switch request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The target is now the active page
    Switched,
    /// The target was already active; nothing changed
    AlreadyActive,
    /// The target never mounted; nothing changed
    Unavailable,
}

#[derive(Debug, Clone, Copy)]
enum Hook {
    LoadOnce,
    LoadOnceView,
    OnceViewAfterUpdate,
    Load,
}

/// Page controller
pub struct PageController<R, B, S> {
    config: LoaderConfig,
    document: Document,
    page_root: NodeId,
    listeners: ListenerTracker,
    templates: TemplateEngine,
    state: LoaderState,
    registry: PageRegistry,
    navigator: Navigator,
    language: LanguageCoordinator,
    navbar: NavigationBar,
    resources: R,
    bridge: B,
    settings: S,
}

impl<R, B, S> PageController<R, B, S>
where
    R: ResourceProvider,
    B: HostBridge,
    S: SettingsStore,
{
    /// Create a controller over an empty document
    pub fn new(config: LoaderConfig, registry: PageRegistry, resources: R, bridge: B, settings: S) -> Self {
        Self::with_document(config, registry, resources, bridge, settings, Document::new())
    }

    /// Create a controller over an existing shell document. A
    /// `page_content` element is created in the body if the shell has none.
    pub fn with_document(
        config: LoaderConfig,
        registry: PageRegistry,
        resources: R,
        bridge: B,
        settings: S,
        mut document: Document,
    ) -> Self {
        let page_root = match document.get_element_by_id(PAGE_ROOT_ID) {
            Some(node) => node,
            None => {
                let body = document.body();
                document.append_element(body, "div", Some(PAGE_ROOT_ID))
            }
        };

        let navbar = NavigationBar::new(
            config.main_pages().into_iter().map(str::to_string).collect(),
            config
                .pages
                .iter()
                .filter(|p| p.is_mini())
                .map(|p| p.id.clone())
                .collect(),
        );

        Self {
            language: LanguageCoordinator::new(&config.default_language),
            config,
            document,
            page_root,
            listeners: ListenerTracker::new(),
            templates: TemplateEngine::new(),
            state: LoaderState::new(),
            registry,
            navigator: Navigator::new(),
            navbar,
            resources,
            bridge,
            settings,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn state(&self) -> &LoaderState {
        &self.state
    }

    pub fn templates(&self) -> &TemplateEngine {
        &self.templates
    }

    pub fn listeners(&self) -> &ListenerTracker {
        &self.listeners
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn resources_mut(&mut self) -> &mut R {
        &mut self.resources
    }

    /// Handle for queueing navigation from outside a hook
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn current_page(&self) -> Option<&str> {
        self.state.current()
    }

    /// Boot: mount every page, apply the persisted UI config and activate
    /// the start page.
    pub async fn start(&mut self) -> Result<SwitchOutcome, LoaderError> {
        self.preload_all().await;
        self.apply_ui_config()?;
        self.apply_text_direction()?;

        self.navbar.mark_initial(&mut self.document);
        self.navbar.bind(&mut self.document, &self.navigator);

        let start_page = self.config.start_page.clone();
        let outcome = self.switch_to(&start_page).await?;
        self.process_navigation().await?;
        Ok(outcome)
    }

    /// Mount every configured page. Pages whose artifacts or module are
    /// missing stay unloaded. Returns how many mounted.
    pub async fn preload_all(&mut self) -> usize {
        let pages = self.config.pages.clone();
        let mut mounted = 0;
        for page in &pages {
            match self.preload_page(page).await {
                Ok(()) => mounted += 1,
                Err(e) => {
                    self.bridge.toast("Error loading page");
                    ErrorLog::record(&mut self.settings, "PageLoader", &format!("{}: {}", page.id, e));
                    tracing::warn!("Page {} left unloaded: {}", page.id, e);
                }
            }
        }
        tracing::info!("Preloaded {}/{} pages", mounted, pages.len());
        mounted
    }

    async fn preload_page(&mut self, page: &PageDescriptor) -> Result<(), LoaderError> {
        if self.state.page(&page.id).is_some() {
            return Ok(());
        }

        let markup_path = page.asset_path(PageAsset::Markup);
        let style_path = page.asset_path(PageAsset::Stylesheet);
        let manifest_path = page.asset_path(PageAsset::ScriptManifest);
        let ((markup, style), manifest) = future::zip(
            future::zip(
                self.resources.fetch_text(&markup_path),
                self.resources.fetch_text(&style_path),
            ),
            self.resources.fetch_text(&manifest_path),
        )
        .await;
        let (markup, style, manifest) = (markup?, style?, manifest?);

        if !self.registry.contains(&page.id) {
            return Err(LoaderError::MissingModule(page.id.clone()));
        }

        let container =
            self.document
                .append_element(self.page_root, "div", Some(&format!("{}_content", page.id)));
        if let Err(e) = self.mount_markup(container, &page.id, &markup) {
            self.document.tree_mut().detach(container);
            return Err(e.into());
        }

        let head = self.document.head();
        let style_node = self
            .document
            .append_element(head, "style", Some(&format!("{}_css", page.id)));
        self.document.set_text_content(style_node, &style)?;
        self.set_style_enabled(style_node, false)?;

        let scripts = manifest
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|src| self.insert_script(&page.id, src))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Mounted page {} with {} script(s)", page.id, scripts.len());
        self.state
            .mount(MountedPage::new(page.clone(), container, style_node, scripts));
        self.run_hook(&page.id, container, Hook::LoadOnce);
        Ok(())
    }

    fn mount_markup(&mut self, container: NodeId, page_id: &str, markup: &str) -> Result<(), DomError> {
        self.document.tree_mut().element_mut(container)?.hidden = true;
        self.document.set_inner_markup(container, markup)?;
        Namespacer::namespace(self.document.tree_mut(), container, page_id)
    }

    /// Insert a module script before the first script in the document,
    /// or into head when there is none
    fn insert_script(&mut self, page_id: &str, src: &str) -> Result<NodeId, DomError> {
        let tree = self.document.tree_mut();
        let script = tree.create_element("script");
        {
            let elem = tree.element_mut(script)?;
            elem.set_attr("src", src);
            elem.set_attr("type", "module");
            elem.set_id(&format!("{page_id}_js"));
        }

        let first = self
            .document
            .get_elements_by_tag_name("script")
            .into_iter()
            .find(|&node| node != script);
        let parent = first.and_then(|node| self.document.tree().get(node).map(|n| n.parent));
        match (first, parent) {
            (Some(first), Some(parent)) if parent.is_valid() => {
                self.document.tree_mut().insert_before(parent, script, first)
            }
            _ => {
                let head = self.document.head();
                self.document.tree_mut().append_child(head, script);
            }
        }
        Ok(script)
    }

    fn set_style_enabled(&mut self, style: NodeId, enabled: bool) -> Result<(), DomError> {
        let elem = self.document.tree_mut().element_mut(style)?;
        elem.set_attr("media", if enabled { "all" } else { "not all" });
        Ok(())
    }

    fn set_visible(&mut self, container: NodeId, visible: bool) -> Result<(), DomError> {
        self.document.tree_mut().element_mut(container)?.hidden = !visible;
        Ok(())
    }

    fn run_hook(&mut self, page_id: &str, container: NodeId, hook: Hook) {
        let Self {
            registry,
            document,
            listeners,
            settings,
            navigator,
            ..
        } = self;
        let Some(module) = registry.get_mut(page_id) else {
            return;
        };

        tracing::trace!("Page {}: {:?}", page_id, hook);
        let mut cx = PageContext {
            page_id,
            container,
            document,
            listeners,
            settings,
            navigator,
        };
        match hook {
            Hook::LoadOnce => module.load_once(&mut cx),
            Hook::LoadOnceView => module.load_once_view(&mut cx),
            Hook::OnceViewAfterUpdate => module.once_view_after_update(&mut cx),
            Hook::Load => module.load(&mut cx),
        }
    }

    /// Strings for `page_id` in the current language. A missing or
    /// malformed bundle yields empty strings so every placeholder stays
    /// visible as its literal.
    async fn page_strings(&self, page_id: &str) -> PageStrings {
        let lang = self.language.current_language(&self.settings);
        let path = format!("lang/{lang}.json");
        let bundle = match self.resources.fetch_text(&path).await {
            Ok(text) => LanguageBundle::from_json(&text).map_err(|source| FetchError::Bundle {
                path: path.clone(),
                source,
            }),
            Err(e) => Err(e),
        };

        let bundle = bundle.unwrap_or_else(|e| {
            self.bridge
                .toast(&format!("Failed to load {lang} strings. Entering safe mode."));
            tracing::warn!("Language bundle unavailable: {}", e);
            LanguageBundle::default()
        });
        bundle.page_strings(page_id, &self.config.main_pages())
    }

    /// Swap the markup of `container` when it changed, then re-attach
    /// tracked listeners to the fresh nodes
    fn replace_markup(&mut self, container: NodeId, before: &str, after: &str) -> Result<(), DomError> {
        if before == after {
            return Ok(());
        }
        self.document.set_inner_markup(container, after)?;
        self.listeners.reapply_listeners(&mut self.document);
        Ok(())
    }

    fn hide(&mut self, page_id: &str) -> Result<(), LoaderError> {
        let Some(page) = self.state.page(page_id) else {
            return Ok(());
        };
        let (container, style) = (page.container, page.style);

        self.set_visible(container, false)?;
        Namespacer::namespace(self.document.tree_mut(), container, page_id)?;
        self.set_style_enabled(style, false)?;
        self.listeners.remove_all_listeners(&mut self.document, None);

        if let Some(page) = self.state.page_mut(page_id) {
            page.status = PageStatus::Hidden;
        }
        tracing::debug!("Hid page {}", page_id);
        Ok(())
    }

    /// Activate `page_id`, hiding the current page.
    ///
    /// The first activation solves the page's placeholders and fires
    /// `load_once_view`; the first activation after a language change hot
    /// reloads them and fires `once_view_after_update`. `load` fires on every
    /// activation, after both.
    pub async fn switch_to(&mut self, page_id: &str) -> Result<SwitchOutcome, LoaderError> {
        if self.state.current() == Some(page_id) {
            tracing::debug!("Page {} already active", page_id);
            return Ok(SwitchOutcome::AlreadyActive);
        }
        let Some(target) = self.state.page(page_id).cloned() else {
            tracing::warn!("Page {} is not loaded", page_id);
            return Ok(SwitchOutcome::Unavailable);
        };
        let container = target.container;

        if let Some(current) = self.state.current().map(str::to_string) {
            self.hide(&current)?;
        }

        Namespacer::restore(self.document.tree_mut(), container, page_id)?;
        self.set_style_enabled(target.style, true)?;
        self.navbar.set_active(&mut self.document, page_id);
        self.state.set_current(Some(page_id.to_string()));
        if let Some(page) = self.state.page_mut(page_id) {
            page.status = PageStatus::Active;
        }

        if !target.view_loaded || !target.localized {
            let strings = self.page_strings(page_id).await;

            if !target.view_loaded {
                let raw = self.document.inner_markup(container);
                let solved = self.templates.solve(&raw, page_id, &strings);
                self.replace_markup(container, &raw, &solved)?;
                Namespacer::apply_state_changes(self.document.tree_mut(), container);
                self.run_hook(page_id, container, Hook::LoadOnceView);
                if let Some(page) = self.state.page_mut(page_id) {
                    page.view_loaded = true;
                }
            }

            if !target.localized {
                let live = self.document.inner_markup(container);
                let reloaded = self.templates.hot_reload(&live, page_id, &strings);
                self.replace_markup(container, &live, &reloaded)?;
                Namespacer::apply_state_changes(self.document.tree_mut(), container);
                self.run_hook(page_id, container, Hook::OnceViewAfterUpdate);
                if let Some(page) = self.state.page_mut(page_id) {
                    page.localized = true;
                }
            }

            self.navbar.localize(&mut self.document, &strings);
        }

        Namespacer::apply_state_changes(self.document.tree_mut(), container);
        self.run_hook(page_id, container, Hook::Load);
        self.set_visible(container, true)?;

        tracing::debug!("Switched to page {}", page_id);
        Ok(SwitchOutcome::Switched)
    }

    /// Re-fetch the active page's raw markup and localize it from scratch.
    /// Returns false when no page is active.
    pub async fn reload_current(&mut self) -> Result<bool, LoaderError> {
        let Some(page) = self.state.current().and_then(|id| self.state.page(id)).cloned() else {
            return Ok(false);
        };
        let page_id = page.descriptor.id.clone();

        let raw = self
            .resources
            .fetch_text(&page.descriptor.asset_path(PageAsset::Markup))
            .await?;
        let strings = self.page_strings(&page_id).await;
        let solved = self.templates.solve(&raw, &page_id, &strings);

        let live = self.document.inner_markup(page.container);
        self.replace_markup(page.container, &live, &solved)?;
        Namespacer::apply_state_changes(self.document.tree_mut(), page.container);
        self.navbar.localize(&mut self.document, &strings);

        if let Some(page) = self.state.page_mut(&page_id) {
            page.view_loaded = true;
            page.localized = true;
        }
        tracing::debug!("Reloaded page {}", page_id);
        Ok(true)
    }

    /// Persist a language choice. Pages pick it up on their next activation.
    pub fn set_language(&mut self, lang: &str) {
        self.language
            .set_language(&mut self.settings, &mut self.state, lang);
    }

    /// Current language, as persisted
    pub fn current_language(&self) -> String {
        self.language.current_language(&self.settings)
    }

    /// Set the document direction for the current language
    pub fn apply_text_direction(&mut self) -> Result<(), DomError> {
        let lang = self.current_language();
        LanguageCoordinator::apply_direction(&mut self.document, &lang)
    }

    /// Read the persisted UI config and apply it
    pub fn apply_ui_config(&mut self) -> Result<UiConfig, DomError> {
        let config = UiConfig::load(&mut self.settings);
        if !config.disable_fullscreen {
            self.bridge.full_screen(true);
        }

        let font_tag = self.document.get_element_by_id(FONT_TAG_ID);
        match (config.enable_system_font, font_tag) {
            (true, None) => {
                let head = self.document.head();
                let tag = self.document.append_element(head, "style", Some(FONT_TAG_ID));
                self.document.set_text_content(tag, SYSTEM_FONT_RULE)?;
            }
            (false, Some(tag)) => self.document.tree_mut().detach(tag),
            _ => {}
        }
        Ok(config)
    }

    /// Drain navigation queued by hooks and listener callbacks, in order.
    /// Returns how many requests ran.
    pub async fn process_navigation(&mut self) -> Result<usize, LoaderError> {
        let mut handled = 0;
        while let Some(request) = self.navigator.pop() {
            tracing::debug!("Navigation request {:?}", request);
            match request {
                NavRequest::Switch(page_id) => {
                    self.switch_to(&page_id).await?;
                }
                NavRequest::SetLanguage(lang) => {
                    self.set_language(&lang);
                    self.apply_text_direction()?;
                }
                NavRequest::Reload => {
                    self.reload_current().await?;
                }
            }
            handled += 1;
        }
        Ok(handled)
    }
}
