//! TriWei Check Core - content-graph validation for the TriWei games site
//!
//! This library provides the checks that keep the games collection of the
//! static site consistent. It serves as the single implementation behind the
//! `triwei-check` CLI, replacing the previous set of standalone build-time
//! scripts.
//!
//! # Architecture
//!
//! Every check reads static files through a [`Site`] handle and produces a
//! [`CheckReport`]. Reports are merged into a
//! [`DiagnosticCollection`](diagnostics::DiagnosticCollection) that the CLI
//! filters and formats:
//!
//! - **links**: template/HTML links against permalinks and the filesystem
//! - **assets**: asset-pack and per-game transfer budgets
//! - **specs**: spec page front matter, sections and links per manifest entry
//! - **games**: manifest sanity, game folders, permalinks and inline scripts
//! - **dist**: total size of the build output directory
//!
//! Content problems are diagnostics, never errors. [`CheckError`] is reserved
//! for failures of the tool itself.

#![forbid(unsafe_code)]

use std::path::{
    Path,
    PathBuf,
};

pub mod checks;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod filtering;
pub mod formatters;
pub mod front_matter;
pub mod glob_pattern;
pub mod links;
pub mod manifest;
pub mod posts;
pub mod script_syntax;
pub mod site;
pub mod sync;

#[cfg(test)]
pub(crate) mod fixtures;

// Public API
pub use checks::{SiteCheck, all_checks, find_check, run_checks};
pub use config::SiteConfig;
pub use diagnostics::CheckReport;
pub use error::{CheckError, CheckResult};
pub use site::Site;

/// Check system version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of parent directories searched for the site root
const ROOT_SEARCH_DEPTH: usize = 12;

/// Detect the site root by walking up from the current directory until a
/// directory containing `games/` is found
pub fn detect_site_root() -> CheckResult<PathBuf> {
    let current = std::env::current_dir()
        .map_err(|e| CheckError::Site(format!("Failed to get current directory: {}", e)))?;
    Ok(find_site_root_from(&current).unwrap_or(current))
}

/// Walk up from `start` looking for a directory that contains `games/`
pub fn find_site_root_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(ROOT_SEARCH_DEPTH)
        .find(|dir| dir.join("games").is_dir())
        .map(Path::to_path_buf)
}
