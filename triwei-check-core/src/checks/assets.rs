//! Asset pack and per-game transfer budgets

use std::collections::{
    HashMap,
    HashSet,
};

use serde_json::Value;

use super::{
    SiteCheck,
    read_or_report,
};
use crate::{
    diagnostics::{
        CheckReport,
        Diagnostic,
        Severity,
    },
    error::CheckResult,
    front_matter::find_number_field,
    glob_pattern::GlobPattern,
    manifest::{
        AssetPack,
        GameEntry,
        ManifestError,
        load_json,
        parse_asset_packs,
    },
    site::Site,
};

/// Checks asset packs against their budgets and games against their specs
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetBudgetCheck;

/// Sizes measured for one valid pack
struct PackUsage<'a> {
    pack:          &'a AssetPack,
    total_bytes:   u64,
    largest_file:  String,
    largest_bytes: u64,
}

fn kb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0
}

impl AssetBudgetCheck {
    fn load(
        &self,
        site: &Site,
        report: &mut CheckReport,
        rel: &str,
    ) -> Option<Value> {
        match load_json(site, rel) {
            Ok(value) => Some(value),
            Err(ManifestError::Missing) => {
                report.error(format!("Missing JSON file: {}", rel)).file = Some(rel.to_string());
                None
            },
            Err(ManifestError::InvalidJson(message)) => {
                report.error(format!("Invalid JSON in {}: {}", rel, message)).file = Some(rel.to_string());
                None
            },
            Err(other) => {
                report.error(format!("Unable to load {}: {}", rel, other)).file = Some(rel.to_string());
                None
            },
        }
    }

    fn measure_pack<'a>(
        &self,
        site: &Site,
        report: &mut CheckReport,
        pack: &'a AssetPack,
        globs: &[String],
        files: &[String],
    ) -> CheckResult<PackUsage<'a>> {
        let slug = pack.slug();
        let patterns = globs.iter().map(|g| GlobPattern::new(g)).collect::<CheckResult<Vec<_>>>()?;

        let mut matched: Vec<&String> =
            files.iter().filter(|f| patterns.iter().any(|p| p.is_match(f))).collect();
        matched.sort();
        if matched.is_empty() {
            report.warning(format!("Asset pack \"{}\" matched no files.", slug));
        }

        let mut usage = PackUsage {
            pack,
            total_bytes: 0,
            largest_file: String::new(),
            largest_bytes: 0,
        };
        for rel in matched {
            let size = site.file_size(rel)?;
            usage.total_bytes += size;
            if size > usage.largest_bytes {
                usage.largest_bytes = size;
                usage.largest_file = rel.clone();
            }
        }

        let packs_file = &site.config().assets.packs;
        if let Some(max) = pack.budgets.max_transfer_kb {
            if kb(usage.total_bytes) > max {
                report.add(
                    Diagnostic::new(
                        self.name(),
                        Severity::Error,
                        format!(
                            "Pack \"{}\" exceeds max_transfer_kb ({:.1} KB > {} KB).",
                            slug,
                            kb(usage.total_bytes),
                            max
                        ),
                    )
                    .with_file(packs_file.as_str())
                    .with_code("pack-over-budget"),
                );
            }
        }
        if let Some(max) = pack.budgets.max_single_file_kb {
            if kb(usage.largest_bytes) > max {
                report.add(
                    Diagnostic::new(
                        self.name(),
                        Severity::Error,
                        format!(
                            "Pack \"{}\" exceeds max_single_file_kb ({}: {:.1} KB > {} KB).",
                            slug,
                            usage.largest_file,
                            kb(usage.largest_bytes),
                            max
                        ),
                    )
                    .with_file(packs_file.as_str())
                    .with_code("pack-over-budget"),
                );
            }
        }

        Ok(usage)
    }

    fn check_game(
        &self,
        site: &Site,
        report: &mut CheckReport,
        game: &GameEntry,
        packs: &HashMap<&str, PackUsage<'_>>,
        file_set: &HashSet<&str>,
    ) -> CheckResult<()> {
        let slug = game.slug();
        let manifest_file = site.config().games.manifest.clone();

        if game.asset_packs.is_empty() {
            report.error(format!("Game \"{}\" must declare at least one asset pack.", slug)).file =
                Some(manifest_file.clone());
        }
        if game.unique_assets.is_empty() {
            report.warning(format!("Game \"{}\" has no unique_assets entries.", slug)).file =
                Some(manifest_file.clone());
        }

        let mut initial_bytes = 0;
        let mut interactive_bytes = 0;

        for pack_slug in &game.asset_packs {
            let Some(usage) = packs.get(pack_slug.as_str()) else {
                report.error(format!("Game \"{}\" references missing pack \"{}\".", slug, pack_slug)).file =
                    Some(manifest_file.clone());
                continue;
            };
            interactive_bytes += usage.total_bytes;
            if usage.pack.is_precached() {
                initial_bytes += usage.total_bytes;
            }
        }

        for raw in &game.unique_assets {
            let rel = raw.replace('\\', "/");
            if !file_set.contains(rel.as_str()) {
                report.add(
                    Diagnostic::new(
                        self.name(),
                        Severity::Error,
                        format!("Game \"{}\" unique asset missing: {}", slug, rel),
                    )
                    .with_file(manifest_file.as_str())
                    .with_code("missing-asset"),
                );
                continue;
            }
            let size = site.file_size(&rel)?;
            initial_bytes += size;
            interactive_bytes += size;
        }

        let spec_rel = format!("{}/{}.md", site.config().specs.dir, slug);
        if !site.is_file(&spec_rel) {
            report.warning(format!("Missing spec for budget check: {}", spec_rel));
            return Ok(());
        }
        let Some(content) = read_or_report(site, report, &spec_rel) else {
            return Ok(());
        };
        let (Some(initial_budget), Some(interactive_budget)) = (
            find_number_field(&content, "initial_transfer_kb"),
            find_number_field(&content, "interactive_transfer_kb"),
        ) else {
            report.warning(format!("Missing spec budget fields in {}", spec_rel)).file =
                Some(spec_rel.clone());
            return Ok(());
        };

        let initial_kb = kb(initial_bytes);
        let interactive_kb = kb(interactive_bytes);
        if initial_kb > initial_budget {
            report.add(
                Diagnostic::new(
                    self.name(),
                    Severity::Error,
                    format!(
                        "Game \"{}\" initial transfer exceeds spec budget ({:.1} KB > {} KB).",
                        slug, initial_kb, initial_budget
                    ),
                )
                .with_file(spec_rel.as_str())
                .with_code("game-over-budget"),
            );
        }
        if interactive_kb > interactive_budget {
            report.add(
                Diagnostic::new(
                    self.name(),
                    Severity::Error,
                    format!(
                        "Game \"{}\" interactive transfer exceeds spec budget ({:.1} KB > {} KB).",
                        slug, interactive_kb, interactive_budget
                    ),
                )
                .with_file(spec_rel.as_str())
                .with_code("game-over-budget"),
            );
        }
        report.info(format!(
            "Game {}: initial {:.1} KB, interactive {:.1} KB",
            slug, initial_kb, interactive_kb
        ));
        Ok(())
    }
}

impl SiteCheck for AssetBudgetCheck {
    fn name(&self) -> &'static str {
        "assets"
    }

    fn description(&self) -> &'static str {
        "Asset packs stay within byte budgets and games within their spec transfer budgets"
    }

    fn run(&self, site: &Site) -> CheckResult<CheckReport> {
        let config = site.config();
        let mut report = CheckReport::new(self.name());

        let packs_value = self.load(site, &mut report, &config.assets.packs);
        let manifest_value = self.load(site, &mut report, &config.games.manifest);

        let packs = packs_value.as_ref().and_then(parse_asset_packs);
        let games = manifest_value.as_ref().and_then(|v| v.get("games")).and_then(Value::as_array);
        let (Some(packs), Some(games)) = (packs, games) else {
            if report.error_count() == 0 {
                report.error("Invalid asset pack or game manifest shape.");
            }
            return Ok(report);
        };

        let files = site.list_files("", &config.assets.skip_dirs)?;
        let file_set: HashSet<&str> = files.iter().map(String::as_str).collect();

        let mut usages: HashMap<&str, PackUsage<'_>> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for pack in &packs {
            let slug = pack.slug();
            if slug.is_empty() {
                report.error("Asset pack missing slug.").file = Some(config.assets.packs.clone());
                continue;
            }
            if usages.contains_key(slug) {
                report.error(format!("Duplicate asset pack slug: {}", slug)).file =
                    Some(config.assets.packs.clone());
                continue;
            }
            let globs = match &pack.globs {
                Some(globs) if !globs.is_empty() => globs,
                _ => {
                    report
                        .error(format!("Asset pack \"{}\" must define a non-empty globs array.", slug))
                        .file = Some(config.assets.packs.clone());
                    continue;
                },
            };

            let usage = self.measure_pack(site, &mut report, pack, globs, &files)?;
            usages.insert(slug, usage);
            order.push(slug);
        }

        for value in games {
            let game = GameEntry::from_value(value).unwrap_or_default();
            if game.slug().is_empty() {
                continue;
            }
            self.check_game(site, &mut report, &game, &usages, &file_set)?;
        }

        order.sort_by_key(|slug| std::cmp::Reverse(usages.get(slug).map_or(0, |u| u.total_bytes)));
        for slug in order {
            let Some(usage) = usages.get(slug) else {
                continue;
            };
            let largest = if usage.largest_file.is_empty() { "(none)" } else { usage.largest_file.as_str() };
            report.info(format!(
                "Pack {}: {:.1} KB total, largest {} ({:.1} KB)",
                slug,
                kb(usage.total_bytes),
                largest,
                kb(usage.largest_bytes)
            ));
        }

        Ok(report)
    }
}
