//! Site root and configuration resolution
//!
//! `--root` wins over auto-detection, and `--config` wins over the config
//! files probed in the site root.

use std::path::{
    Path,
    PathBuf,
};

use anyhow::{
    Context,
    Result,
};
use triwei_check_core::{
    Site,
    SiteConfig,
    config::CONFIG_FILE_CANDIDATES,
    detect_site_root,
};

use super::GlobalArgs;

/// A site handle together with where its configuration came from
#[derive(Debug)]
pub struct LoadedSite {
    pub site:          Site,
    pub config_source: Option<PathBuf>,
}

/// Resolve the site root from `--root` or by walking up from the current directory
pub fn resolve_site_root(args: &GlobalArgs) -> Result<PathBuf> {
    match &args.root {
        Some(root) => {
            let path = PathBuf::from(root);
            if !path.is_dir() {
                anyhow::bail!("Site root does not exist: {}", path.display());
            }
            Ok(path)
        },
        None => detect_site_root().context("Failed to detect site root"),
    }
}

/// Load configuration from `--config` or from the first candidate file in the root
pub fn load_config_file(root: &Path, explicit: Option<&str>) -> Result<(SiteConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let path = PathBuf::from(path);
        let config = SiteConfig::load_file(&path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?;
        return Ok((config, Some(path)));
    }
    SiteConfig::discover(root).with_context(|| {
        format!("Failed to load config file from {} (tried {})", root.display(), CONFIG_FILE_CANDIDATES.join(", "))
    })
}

/// Resolve the root, load its configuration and build a site handle
pub fn load_site(args: &GlobalArgs) -> Result<LoadedSite> {
    let root = resolve_site_root(args)?;
    let (config, config_source) = load_config_file(&root, args.config.as_deref())?;

    args.output.verbose(&format!("Site root: {}", root.display()));
    match &config_source {
        Some(path) => args.output.verbose(&format!("Config: {}", path.display())),
        None => args.output.verbose("Config: built-in defaults"),
    }

    Ok(LoadedSite {
        site: Site::new(root, config),
        config_source,
    })
}
