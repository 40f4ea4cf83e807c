//! Miniature site used by the check tests

use std::{
    fs,
    path::Path,
};

use serde_json::{
    Value,
    json,
};
use tempfile::TempDir;

use crate::{
    config::SiteConfig,
    site::Site,
};

/// Temporary site checkout
pub(crate) struct FixtureSite {
    temp: TempDir,
}

impl FixtureSite {
    /// Empty site directory
    pub(crate) fn empty() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    /// A site with one game that passes every content check
    pub(crate) fn valid() -> Self {
        let fixture = Self::empty();

        fixture.write_json(
            "games/manifest.json",
            &json!({"games": [{
                "slug": "linreg",
                "title": "Linear Regression",
                "route": "/games/linreg/",
                "spec_url": "/games/specs/linreg/",
                "asset_packs": ["core"],
                "unique_assets": ["games/linreg/hero.png"]
            }]}),
        );
        fixture.write_json("games/card_overrides.json", &json!({"linreg": {"badge": "new", "accent": "#0af"}}));
        fixture.write_json(
            "_data/asset_packs.json",
            &json!([{
                "slug": "core",
                "globs": ["assets/core/**"],
                "preload_policy": "precache",
                "budgets": {"max_transfer_kb": 64, "max_single_file_kb": 32}
            }]),
        );

        fixture.write("assets/core/engine.js", vec![b'e'; 4096]);
        fixture.write("assets/core/font.woff2", vec![b'f'; 1024]);
        fixture.write("games/linreg/hero.png", vec![b'p'; 2048]);
        fixture.write("games/linreg/style.css", "canvas { width: 100%; }\n");

        fixture.write(
            "games/linreg/index.html",
            game_page("/games/linreg/", "const canvas = document.getElementById('game');\nlet score = 0;\nfunction tick() { score += 1; requestAnimationFrame(tick); }\ntick();")
                .replace("<canvas", "<link rel=\"stylesheet\" href=\"style.css\">\n<canvas"),
        );
        fixture.write(
            "games/index.md",
            "---\nlayout: page\ntitle: Games\npermalink: /games/\n---\n<a href=\"{{ '/games/linreg/' | relative_url }}\">Linear Regression</a>\n",
        );
        fixture.write(
            "games/specs/index.md",
            "---\nlayout: page\ntitle: Game Specs\npermalink: /games/specs/\n---\n{% for game in site.data.games_manifest.games %}\n- [{{ game.title }}]({{ game.spec_url | relative_url }})\n{% endfor %}\n",
        );
        fixture.write("games/specs/linreg.md", spec_page("linreg", "/games/linreg/"));

        fixture.write(
            "_layouts/default.html",
            "<html>\n<body>\n{{ content }}\n<script src=\"{{ '/assets/core/engine.js' | relative_url }}\"></script>\n<a href=\"https://github.com/triwei\">source</a>\n</body>\n</html>\n",
        );
        fixture.write(
            "_includes/nav.html",
            "<nav>\n<a href=\"{{ '/games/' | relative_url }}\">Games</a>\n<a href=\"{{ '/about/' | relative_url }}\">About</a>\n</nav>\n",
        );
        fixture.write("index.md", "---\nlayout: default\npermalink: /\n---\n<a href=\"/games/\">Play</a>\n");
        fixture.write("about.md", "---\nlayout: default\npermalink: /about/\n---\nAbout TriWei\n");

        fixture
    }

    pub(crate) fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Site handle with the default configuration
    pub(crate) fn site(&self) -> Site {
        Site::with_defaults(self.root())
    }

    pub(crate) fn site_with(&self, config: SiteConfig) -> Site {
        Site::new(self.root(), config)
    }

    pub(crate) fn write(&self, rel: &str, content: impl AsRef<[u8]>) {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub(crate) fn write_json(&self, rel: &str, value: &Value) {
        self.write(rel, serde_json::to_string_pretty(value).unwrap());
    }

    pub(crate) fn mkdir(&self, rel: &str) {
        fs::create_dir_all(self.root().join(rel)).unwrap();
    }

    pub(crate) fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root().join(rel)).unwrap()
    }

    /// Remove a file or a whole directory
    pub(crate) fn remove(&self, rel: &str) {
        let path = self.root().join(rel);
        if path.is_dir() {
            fs::remove_dir_all(path).unwrap();
        } else {
            fs::remove_file(path).unwrap();
        }
    }
}

/// Game page with front matter and one inline script
pub(crate) fn game_page(permalink: &str, script: &str) -> String {
    format!(
        "---\nlayout: game\ntitle: Game\npermalink: {}\n---\n<canvas id=\"game\"></canvas>\n<script>\n{}\n</script>\n",
        permalink, script
    )
}

/// Spec page with every required key and section
pub(crate) fn spec_page(slug: &str, route: &str) -> String {
    format!(
        r#"---
layout: spec
title: "Spec: {slug}"
slug: {slug}
kind: lab
game_url: {route}
permalink: /games/specs/{slug}/
tags: [math, statistics]
difficulty: easy
session_length: 5m
last_reviewed: 2026-01-15
asset_budget:
  initial_transfer_kb: 100
  interactive_transfer_kb: 200
  max_runtime_ram_mb: 64
  max_gpu_tex_mb: 16
---
## Overview
Fit a line to noisy points. [Play]({route})

## Learning Lens
Least squares.

## Controls
Drag points.

## Core Loop
Place, fit, compare.

## Scoring and Metrics
Residual error.

## Failure States
None.

## Determinism and Randomness
Seeded point sets.

## Instrumentation Contract
Emits fit events.

## Accessibility Notes
Keyboard reachable.

## Test Checklist
- [ ] Fit converges

[Back to specs](index.md)
"#
    )
}
