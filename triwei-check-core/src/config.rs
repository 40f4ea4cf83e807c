//! Configuration management for the site checks
//!
//! Every field defaults to the layout the site actually uses, so a site
//! without a config file is checked exactly as before. A TOML file can
//! override any section.

use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::{
    CheckError,
    CheckResult,
};

/// File names probed (in order) when no explicit config path is given
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
    [".triwei-check.toml", "triwei-check.toml", ".config/triwei-check.toml"];

/// Top-level check configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Link checker settings
    pub links:  LinksConfig,
    /// Game manifest and folder settings
    pub games:  GamesConfig,
    /// Spec page settings
    pub specs:  SpecsConfig,
    /// Asset budget settings
    pub assets: AssetsConfig,
    /// Build output settings
    pub dist:   DistConfig,
    /// Data sync settings
    pub sync:   SyncConfig,
    /// Post scaffolding settings
    pub posts:  PostsConfig,
}

/// Link checker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// Directories scanned recursively for `.html`/`.md` files
    pub scan_roots:     Vec<String>,
    /// Top-level pages scanned when present
    pub single_files:   Vec<String>,
    /// Absolute routes that are generated at build time
    pub ignored_routes: Vec<String>,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            scan_roots:     strings(&["_includes", "_layouts", "games"]),
            single_files:   strings(&[
                "index.md",
                "about.md",
                "experiments.md",
                "guides.md",
                "knowledge.md",
                "blog.md",
                "contact.md",
            ]),
            ignored_routes: strings(&["/feed.xml", "/sitemap.xml"]),
        }
    }
}

/// Game manifest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamesConfig {
    /// Directory holding one folder per game
    pub dir:           String,
    /// Manifest listing every game
    pub manifest:      String,
    /// Games hub page
    pub hub_page:      String,
    /// Subdirectories of `dir` that are not games and never warn
    pub non_game_dirs: Vec<String>,
}

impl Default for GamesConfig {
    fn default() -> Self {
        Self {
            dir:           "games".to_string(),
            manifest:      "games/manifest.json".to_string(),
            hub_page:      "games/index.md".to_string(),
            non_game_dirs: Vec::new(),
        }
    }
}

/// Spec page configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecsConfig {
    /// Directory holding `<slug>.md` spec pages
    pub dir:                   String,
    /// Spec index page
    pub index:                 String,
    /// Text the spec index must contain to render the manifest
    pub index_marker:          String,
    /// Top-level front matter keys every spec page needs
    pub required_front_matter: Vec<String>,
    /// Keys that must appear inside the `asset_budget` block
    pub required_budget_keys:  Vec<String>,
    /// `##` sections every spec page needs
    pub required_sections:     Vec<String>,
}

impl Default for SpecsConfig {
    fn default() -> Self {
        Self {
            dir:                   "games/specs".to_string(),
            index:                 "games/specs/index.md".to_string(),
            index_marker:          "site.data.games_manifest.games".to_string(),
            required_front_matter: strings(&[
                "layout",
                "title",
                "slug",
                "kind",
                "game_url",
                "permalink",
                "tags",
                "difficulty",
                "session_length",
                "last_reviewed",
                "asset_budget",
            ]),
            required_budget_keys:  strings(&[
                "initial_transfer_kb",
                "interactive_transfer_kb",
                "max_runtime_ram_mb",
                "max_gpu_tex_mb",
            ]),
            required_sections:     strings(&[
                "Overview",
                "Learning Lens",
                "Controls",
                "Core Loop",
                "Scoring and Metrics",
                "Failure States",
                "Determinism and Randomness",
                "Instrumentation Contract",
                "Accessibility Notes",
                "Test Checklist",
            ]),
        }
    }
}

/// Asset budget configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Asset pack definitions
    pub packs:     String,
    /// Directory names never scanned for assets
    pub skip_dirs: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            packs:     "_data/asset_packs.json".to_string(),
            skip_dirs: strings(&[".git", "node_modules"]),
        }
    }
}

/// Build output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistConfig {
    /// Build output directory
    pub dir:       String,
    /// Maximum size in MB
    pub budget_mb: u64,
}

impl Default for DistConfig {
    fn default() -> Self {
        Self {
            dir:       "dist".to_string(),
            budget_mb: 300,
        }
    }
}

/// Data sync configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Source/destination pairs
    pub mappings: Vec<SyncMapping>,
}

/// One JSON file copied into the site data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMapping {
    /// Source path relative to the site root
    pub src:  String,
    /// Destination path relative to the site root
    pub dest: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            mappings: vec![
                SyncMapping {
                    src:  "games/manifest.json".to_string(),
                    dest: "_data/games_manifest.json".to_string(),
                },
                SyncMapping {
                    src:  "games/card_overrides.json".to_string(),
                    dest: "_data/games_card_overrides.json".to_string(),
                },
            ],
        }
    }
}

/// Post scaffolding configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostsConfig {
    /// Directory new posts are written to
    pub dir:    String,
    /// Author written into front matter
    pub author: String,
    /// Topics rotated through when none is given
    pub topics: Vec<String>,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            dir:    "_posts".to_string(),
            author: "AI Bot".to_string(),
            topics: strings(&[
                "latest AI news",
                "exciting AI tools",
                "ethical AI considerations",
                "AI research breakthroughs",
                "AI in everyday life",
            ]),
        }
    }
}

impl SiteConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> CheckResult<Self> {
        toml::from_str(content).map_err(|e| CheckError::Config(e.to_string()))
    }

    /// Load configuration from an explicit file
    pub fn load_file(path: &Path) -> CheckResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CheckError::io(path, e))?;
        Self::from_toml(&content).map_err(|e| match e {
            CheckError::Config(msg) => {
                CheckError::Config(format!("{}: {}", path.display(), msg))
            },
            other => other,
        })
    }

    /// Locate and load the site's config file, falling back to defaults.
    ///
    /// Returns the configuration together with the file it came from.
    pub fn discover(site_root: &Path) -> CheckResult<(Self, Option<PathBuf>)> {
        for candidate in CONFIG_FILE_CANDIDATES {
            let path = site_root.join(candidate);
            if path.is_file() {
                return Ok((Self::load_file(&path)?, Some(path)));
            }
        }
        Ok((Self::default(), None))
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}
