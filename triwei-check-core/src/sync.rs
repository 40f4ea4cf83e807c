//! Copies the games manifest and card overrides into the site data directory
//!
//! The site generator only reads `_data/`, so the canonical files under
//! `games/` are mirrored there, reformatted as 2-space JSON.

use std::fs;

use serde_json::Value;

use crate::{
    config::SyncMapping,
    error::{
        CheckError,
        CheckResult,
    },
    site::Site,
};

/// One completed copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedFile {
    /// Source path relative to the site root
    pub src:  String,
    /// Destination path relative to the site root
    pub dest: String,
}

/// Sync every configured mapping, stopping at the first failure.
///
/// `on_synced` is called as soon as each mapping has been written.
pub fn sync_data(site: &Site, mut on_synced: impl FnMut(&SyncedFile)) -> CheckResult<Vec<SyncedFile>> {
    let mut synced = Vec::new();
    for mapping in &site.config().sync.mappings {
        let file = sync_mapping(site, mapping)?;
        on_synced(&file);
        synced.push(file);
    }
    Ok(synced)
}

/// Reformat `mapping.src` into `mapping.dest`
pub fn sync_mapping(site: &Site, mapping: &SyncMapping) -> CheckResult<SyncedFile> {
    if !site.is_file(&mapping.src) {
        return Err(CheckError::Site(format!("Missing source JSON: {}", mapping.src)));
    }
    let raw = site.read_text(&mapping.src)?;
    let parsed: Value = serde_json::from_str(&raw).map_err(|e| CheckError::Json {
        path:    mapping.src.clone(),
        message: e.to_string(),
    })?;

    let mut output = serde_json::to_string_pretty(&parsed).map_err(|e| CheckError::Json {
        path:    mapping.dest.clone(),
        message: e.to_string(),
    })?;
    output.push('\n');

    let dest = site.abs(&mapping.dest);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| CheckError::io(parent, e))?;
    }
    fs::write(&dest, output).map_err(|e| CheckError::io(&dest, e))?;

    Ok(SyncedFile {
        src:  mapping.src.clone(),
        dest: mapping.dest.clone(),
    })
}
