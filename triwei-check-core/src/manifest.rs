//! Games manifest and asset pack models
//!
//! Both files are hand-edited JSON, so the models are lenient: wrong-typed
//! or missing fields fall back to empty values and are reported by the
//! checks instead of failing deserialization.

use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};
use serde_json::Value;
use thiserror::Error;

use crate::site::Site;

/// Why a JSON input could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    /// File does not exist
    #[error("missing file")]
    Missing,
    /// File exists but could not be read
    #[error("unreadable: {0}")]
    Unreadable(String),
    /// File is not valid JSON
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    /// Document lacks a top-level `games` array
    #[error("no top-level games array")]
    MissingGames,
}

/// Read and parse a site-relative JSON file
pub fn load_json(site: &Site, rel: &str) -> Result<Value, ManifestError> {
    if !site.is_file(rel) {
        return Err(ManifestError::Missing);
    }
    let content = site.read_text(rel).map_err(|e| ManifestError::Unreadable(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| ManifestError::InvalidJson(e.to_string()))
}

/// Parsed `games/manifest.json`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamesManifest {
    /// Raw entries, in file order
    pub games: Vec<Value>,
}

impl GamesManifest {
    /// Load the manifest configured for `site`
    pub fn load(site: &Site) -> Result<Self, ManifestError> {
        Self::from_value(load_json(site, &site.config().games.manifest)?)
    }

    /// Build from an already parsed document
    pub fn from_value(value: Value) -> Result<Self, ManifestError> {
        match value {
            Value::Object(mut map) => match map.remove("games") {
                Some(Value::Array(games)) => Ok(Self { games }),
                _ => Err(ManifestError::MissingGames),
            },
            _ => Err(ManifestError::MissingGames),
        }
    }

    /// Entries as typed values; `None` for entries that are not objects
    pub fn entries(&self) -> impl Iterator<Item = Option<GameEntry>> + '_ {
        self.games.iter().map(GameEntry::from_value)
    }

    /// Number of raw entries
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Whether the manifest lists nothing
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

/// One manifest entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub slug:          String,
    #[serde(deserialize_with = "lenient_string")]
    pub title:         String,
    #[serde(deserialize_with = "lenient_string")]
    pub route:         String,
    #[serde(deserialize_with = "lenient_optional_string")]
    pub spec_url:      Option<String>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub asset_packs:   Vec<String>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub unique_assets: Vec<String>,
}

impl GameEntry {
    /// Typed view of a raw entry; `None` unless it is a JSON object
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// Slug with surrounding whitespace removed
    pub fn slug(&self) -> &str {
        self.slug.trim()
    }

    /// Title with surrounding whitespace removed
    pub fn title(&self) -> &str {
        self.title.trim()
    }

    /// Route with surrounding whitespace removed
    pub fn route(&self) -> &str {
        self.route.trim()
    }
}

/// Byte budgets of an asset pack, in KB
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackBudgets {
    #[serde(deserialize_with = "lenient_number")]
    pub max_transfer_kb:    Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub max_single_file_kb: Option<f64>,
}

/// Group of shared asset files loaded together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetPack {
    #[serde(deserialize_with = "lenient_string")]
    pub slug:           String,
    /// `None` when the field is absent or not an array
    #[serde(deserialize_with = "lenient_optional_list")]
    pub globs:          Option<Vec<String>>,
    #[serde(deserialize_with = "lenient_budgets")]
    pub budgets:        PackBudgets,
    #[serde(deserialize_with = "lenient_optional_string")]
    pub preload_policy: Option<String>,
}

impl AssetPack {
    /// Slug with surrounding whitespace removed
    pub fn slug(&self) -> &str {
        self.slug.trim()
    }

    /// Whether the pack is part of the initial page load
    pub fn is_precached(&self) -> bool {
        self.preload_policy.as_deref() == Some("precache")
    }
}

/// Parse the pack list; `None` unless the document is an array
pub fn parse_asset_packs(value: &Value) -> Option<Vec<AssetPack>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .map(|item| serde_json::from_value(item.clone()).unwrap_or_default())
            .collect(),
    )
}

/// Render a JSON scalar the way it would appear in a message
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value).unwrap_or_default())
}

fn lenient_optional_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

fn lenient_optional_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| items.iter().map(|item| value_to_string(item).unwrap_or_default()).collect()))
}

fn lenient_string_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    Ok(lenient_optional_list(deserializer)?.unwrap_or_default())
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite()))
}

fn lenient_budgets<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PackBudgets, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
