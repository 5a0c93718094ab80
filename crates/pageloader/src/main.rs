//! Page loader runner
//!
//! Boots the loader over a webroot on disk and walks through the pages
//! named on the command line. `pageloader.json` in the working directory,
//! when present, supplies the config; a webroot given on the command line
//! overrides the configured one.
//!
//! Usage: pageloader [webroot] [page...]

use anyhow::{Context, Result};
use pageloader::{
    FsResources, JsonFileStore, LoaderConfig, PageController, PageRegistry, ProcessBridge, StaticPage,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const CONFIG_FILE: &str = "pageloader.json";
const SETTINGS_FILE: &str = ".pageloader-settings.json";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let webroot = args.next().map(PathBuf::from);
    let pages: Vec<String> = args.collect();

    let config_path = Path::new(CONFIG_FILE);
    let mut config = if config_path.exists() {
        LoaderConfig::load(config_path).with_context(|| format!("loading {}", config_path.display()))?
    } else {
        LoaderConfig::default()
    };
    if let Some(webroot) = webroot {
        config.webroot = webroot;
    }
    tracing::debug!("Serving pages from {}", config.webroot.display());

    let mut registry = PageRegistry::new();
    for page in &config.pages {
        registry.register(&page.id, StaticPage);
    }

    let settings = JsonFileStore::open(config.webroot.join(SETTINGS_FILE));
    let resources = FsResources::new(&config.webroot);
    let mut controller = PageController::new(config, registry, resources, ProcessBridge, settings);

    smol::block_on(async {
        let outcome = controller.start().await?;
        tracing::info!(
            "Started on {:?} ({:?}) in {}",
            controller.current_page(),
            outcome,
            controller.current_language()
        );

        for page in &pages {
            let outcome = controller.switch_to(page).await?;
            controller.process_navigation().await?;
            tracing::info!("{}: {:?}", page, outcome);
        }
        Ok::<_, anyhow::Error>(())
    })?;

    let mounted = controller.state().mounted();
    tracing::info!("{} page(s) mounted, {} tracked listener key(s)", mounted, controller.listeners().len());
    Ok(())
}
