//! Manifest sanity, game folders, permalinks, scripts and routes

use std::{
    collections::HashSet,
    sync::LazyLock,
};

use regex::Regex;

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
    front_matter::find_game_permalink,
    links::{
        RouteIssueKind,
        RouteResolver,
        RouteStrategy,
        extract_template_links,
    },
    manifest::{
        GamesManifest,
        ManifestError,
    },
    script_syntax::check_script,
    site::Site,
};

static INLINE_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<script>\s*(.*?)\s*</script>").unwrap_or_else(|e| panic!("script regex: {e}"))
});

/// Sanity checks over the games collection
#[derive(Debug, Clone, Copy, Default)]
pub struct GameSanityCheck;

/// A game folder that has an `index.html`
struct GamePage {
    folder: String,
    page:   String,
}

impl GameSanityCheck {
    /// Validate manifest entries and return the slugs they declare
    fn check_manifest(&self, site: &Site, report: &mut CheckReport) -> Vec<String> {
        let manifest_rel = site.config().games.manifest.clone();
        let manifest = match GamesManifest::load(site) {
            Ok(manifest) => manifest,
            Err(e) => {
                let message = match e {
                    ManifestError::Missing => format!("Missing game manifest: {}", manifest_rel),
                    ManifestError::MissingGames => {
                        format!("{} must contain a top-level \"games\" array.", manifest_rel)
                    },
                    ManifestError::InvalidJson(e) | ManifestError::Unreadable(e) => {
                        format!("Invalid JSON in {}: {}", manifest_rel, e)
                    },
                };
                report.error(message).file = Some(manifest_rel);
                return Vec::new();
            },
        };

        let mut fail = |message: String| {
            report.error(message).file = Some(manifest_rel.clone());
        };
        let mut slugs = Vec::new();
        let mut seen_slugs = HashSet::new();
        let mut seen_routes = HashSet::new();

        for entry in manifest.entries() {
            let Some(entry) = entry else {
                fail("Manifest entry is not an object.".to_string());
                continue;
            };
            let slug = entry.slug();
            let route = entry.route();
            let label = if slug.is_empty() { "<unknown>" } else { slug };

            if slug.is_empty() {
                fail("Manifest entry missing slug.".to_string());
            }
            if entry.title().is_empty() {
                fail(format!("Manifest entry missing title for slug \"{}\".", label));
            }
            if route.is_empty() {
                fail(format!("Manifest entry missing route for slug \"{}\".", label));
            }
            if !slug.is_empty() && !seen_slugs.insert(slug.to_string()) {
                fail(format!("Duplicate slug in manifest: {}", slug));
            }
            if !route.is_empty() && !seen_routes.insert(route.to_string()) {
                fail(format!("Duplicate route in manifest: {}", route));
            }

            if !slug.is_empty() && !route.is_empty() {
                let expected = format!("/games/{}/", slug);
                if route != expected {
                    fail(format!(
                        "Manifest route mismatch for slug \"{}\". Expected {}, found {}",
                        slug, expected, route
                    ));
                }
            }
            if !slug.is_empty() {
                slugs.push(slug.to_string());
            }
        }

        report.info(format!("Manifest games listed: {}", manifest.len()));
        slugs
    }

    /// Compare manifest slugs with the folders on disk
    fn check_folders(
        &self,
        site: &Site,
        report: &mut CheckReport,
        slugs: &[String],
    ) -> CheckResult<(Vec<String>, Vec<GamePage>)> {
        let games = &site.config().games;
        if !site.is_dir(&games.dir) {
            report.error(format!("Missing games directory: {}", games.dir));
            return Ok((Vec::new(), Vec::new()));
        }

        for slug in slugs {
            let dir = format!("{}/{}", games.dir, slug);
            if !site.is_dir(&dir) {
                report.error(format!("Expected game folder missing: {}", dir));
                continue;
            }
            let page = format!("{}/index.html", dir);
            if !site.is_file(&page) {
                report.error(format!("Expected game page missing: {}", page)).file = Some(dir);
            }
        }

        let folders = site.subdirectories(&games.dir)?;
        let pages = folders
            .iter()
            .map(|folder| GamePage {
                folder: folder.clone(),
                page:   format!("{}/{}/index.html", games.dir, folder),
            })
            .filter(|game| site.is_file(&game.page))
            .collect();

        let discovered: HashSet<&str> = folders.iter().map(String::as_str).collect();
        let mut expected = Vec::new();
        for slug in slugs {
            if !expected.contains(&slug.as_str()) {
                expected.push(slug.as_str());
            }
        }
        for slug in &expected {
            if !discovered.contains(slug) {
                report.error(format!("Manifest slug has no matching folder: {}/{}", games.dir, slug));
            }
        }
        for folder in &folders {
            if !expected.contains(&folder.as_str()) && !games.non_game_dirs.contains(folder) {
                report.warning(format!("Game folder not listed in manifest: {}/{}", games.dir, folder));
            }
        }

        if !site.is_file(&games.hub_page) {
            report.error(format!("Missing games hub page: {}", games.hub_page));
        }

        Ok((folders, pages))
    }

    fn check_permalink(&self, report: &mut CheckReport, game: &GamePage, content: &str) {
        let expected = format!("/games/{}/", game.folder);
        match find_game_permalink(content) {
            None => {
                report.error(format!("Missing or invalid game permalink front matter in {}", game.page)).file =
                    Some(game.page.clone());
            },
            Some(found) if found != expected => {
                report.error(format!(
                    "Permalink mismatch in {}. Expected {}, found {}",
                    game.page, expected, found
                ))
                .file = Some(game.page.clone());
            },
            Some(_) => {},
        }
    }

    fn parse_script(&self, report: &mut CheckReport, source: &str, label: &str, file: &str, first_line: u32) {
        if let Err(issue) = check_script(source) {
            report.add(
                Diagnostic::new(
                    self.name(),
                    Severity::Error,
                    format!("JavaScript parse failed in {}: {}", label, issue),
                )
                .with_file(file)
                .with_line(first_line + issue.line - 1)
                .with_code("script-syntax"),
            );
        }
    }

    /// Parse sibling `script.js` files and inline `<script>` blocks
    fn check_scripts(&self, site: &Site, report: &mut CheckReport, pages: &[(&GamePage, String)]) {
        let mut script_files = 0;
        let mut inline_scripts = 0;

        for (game, content) in pages {
            let script_rel = format!("{}/{}/script.js", site.config().games.dir, game.folder);
            if site.is_file(&script_rel) {
                script_files += 1;
                if let Some(source) = read_or_report(site, report, &script_rel) {
                    self.parse_script(report, &source, &script_rel, &script_rel, 1);
                }
            }

            let blocks: Vec<_> = INLINE_SCRIPT.captures_iter(content).filter_map(|caps| caps.get(1)).collect();
            if blocks.is_empty() {
                report.warning(format!("No inline script found in {}.", game.page)).file = Some(game.page.clone());
                continue;
            }
            for (index, block) in blocks.iter().enumerate() {
                inline_scripts += 1;
                let first_line = content[..block.start()].matches('\n').count() as u32 + 1;
                let label = format!("{} <script #{}>", game.page, index + 1);
                self.parse_script(report, block.as_str(), &label, &game.page, first_line);
            }
        }

        if script_files == 0 {
            report.info("No games/*/script.js files detected; validated inline scripts instead.");
        }
        report.info(format!("Inline scripts parsed: {}", inline_scripts));
    }

    fn check_routes(&self, site: &Site, report: &mut CheckReport, files: Vec<(String, String)>) {
        let resolver = RouteResolver::new(site, RouteStrategy::TopLevelMarkdown);
        for (file, content) in files {
            for link in extract_template_links(&content) {
                let Some(issue) = resolver.resolve(&link.target, &file) else {
                    continue;
                };
                let label = match issue.kind {
                    RouteIssueKind::RouteWithoutIndex => "Route has no index file",
                    RouteIssueKind::UnresolvedRoute => "Unresolved route",
                    RouteIssueKind::UnresolvedRelative => "Unresolved relative path",
                };
                report.add(
                    Diagnostic::new(
                        self.name(),
                        Severity::Error,
                        format!("{}: {} (referenced in {})", label, issue.route, file),
                    )
                    .with_file(file.as_str())
                    .with_line(link.line)
                    .with_code(issue.kind.code()),
                );
            }
        }
    }
}

impl SiteCheck for GameSanityCheck {
    fn name(&self) -> &'static str {
        "games"
    }

    fn description(&self) -> &'static str {
        "Manifest entries, game folders, permalinks, inline scripts and routes agree"
    }

    fn run(&self, site: &Site) -> CheckResult<CheckReport> {
        let mut report = CheckReport::new(self.name());

        let slugs = self.check_manifest(site, &mut report);
        let (folders, games) = self.check_folders(site, &mut report, &slugs)?;

        let mut pages = Vec::with_capacity(games.len());
        for game in &games {
            if let Some(content) = read_or_report(site, &mut report, &game.page) {
                pages.push((game, content));
            }
        }

        for (game, content) in &pages {
            self.check_permalink(&mut report, game, content);
        }
        self.check_scripts(site, &mut report, &pages);

        let hub_page = &site.config().games.hub_page;
        let mut route_files = Vec::new();
        if site.is_file(hub_page) {
            if let Some(content) = read_or_report(site, &mut report, hub_page) {
                route_files.push((hub_page.clone(), content));
            }
        }
        route_files.extend(pages.into_iter().map(|(game, content)| (game.page.clone(), content)));
        self.check_routes(site, &mut report, route_files);

        report.stat("Games discovered", folders.len());
        report.stat("Game pages checked", games.len());
        Ok(report)
    }
}
