//! Spec page consistency for every manifest entry

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
    front_matter::{
        FrontMatter,
        has_heading,
    },
    links::{
        RouteIssueKind,
        RouteResolver,
        RouteStrategy,
        extract_markdown_links,
    },
    manifest::{
        GameEntry,
        GamesManifest,
        ManifestError,
    },
    site::Site,
};

/// Checks spec pages against the manifest
#[derive(Debug, Clone, Copy, Default)]
pub struct GameSpecCheck;

impl GameSpecCheck {
    fn load_manifest(&self, site: &Site, report: &mut CheckReport) -> Vec<serde_json::Value> {
        let manifest = &site.config().games.manifest;
        let message = match GamesManifest::load(site) {
            Ok(loaded) => return loaded.games,
            Err(ManifestError::Missing) => format!("Missing games manifest: {}", manifest),
            Err(ManifestError::MissingGames) => {
                format!("{} must contain a top-level games array.", manifest)
            },
            Err(ManifestError::InvalidJson(e) | ManifestError::Unreadable(e)) => {
                format!("Invalid JSON in {}: {}", manifest, e)
            },
        };
        report.error(message).file = Some(manifest.clone());
        Vec::new()
    }

    fn check_index(&self, site: &Site, report: &mut CheckReport) {
        let specs = &site.config().specs;
        if !site.is_file(&specs.index) {
            report.error(format!("Missing specs index: {}", specs.index));
            return;
        }
        let Some(content) = read_or_report(site, report, &specs.index) else {
            return;
        };
        if !content.contains(&specs.index_marker) {
            report.error(format!("{} should render entries from {}.", specs.index, specs.index_marker)).file =
                Some(specs.index.clone());
        }
    }

    fn check_entry(&self, site: &Site, report: &mut CheckReport, game: &GameEntry) {
        let specs = &site.config().specs;
        let slug = game.slug().trim_matches('/');
        if slug.is_empty() {
            report.error("Manifest entry missing slug.").file = Some(site.config().games.manifest.clone());
            return;
        }

        let expected_spec_url = format!("/games/specs/{}/", slug);
        if game.spec_url.as_deref() != Some(expected_spec_url.as_str()) {
            report.error(format!(
                "Manifest spec_url mismatch for {}. Expected {}, found {}",
                slug,
                expected_spec_url,
                game.spec_url.as_deref().filter(|s| !s.is_empty()).unwrap_or("<missing>")
            ))
            .file = Some(site.config().games.manifest.clone());
        }

        let spec_rel = format!("{}/{}.md", specs.dir, slug);
        if !site.is_file(&spec_rel) {
            report.error(format!("Missing spec page for {}: {}", slug, spec_rel));
            return;
        }
        let Some(content) = read_or_report(site, report, &spec_rel) else {
            return;
        };

        let Some(front_matter) = FrontMatter::parse(&content) else {
            report.error(format!("Missing front matter in {}", spec_rel)).file =
                Some(spec_rel.clone());
            return;
        };

        let mut fail = |message: String| {
            report.error(message).file = Some(spec_rel.clone());
        };
        for key in &specs.required_front_matter {
            if !front_matter.has_key(key) {
                fail(format!("Missing front matter key \"{}\" in {}", key, spec_rel));
            }
        }
        for key in &specs.required_budget_keys {
            if !front_matter.has_nested_key(key) {
                fail(format!("Missing asset_budget key \"{}\" in {}", key, spec_rel));
            }
        }

        let expected = [
            ("slug", "Spec slug mismatch", slug),
            ("permalink", "Spec permalink mismatch", expected_spec_url.as_str()),
            ("game_url", "Spec game_url mismatch", game.route()),
        ];
        for (key, label, want) in expected {
            let found = front_matter.get_unquoted(key).unwrap_or("");
            if found != want {
                fail(format!(
                    "{} in {}. Expected \"{}\", found \"{}\"",
                    label,
                    spec_rel,
                    want,
                    if found.is_empty() { "<missing>" } else { found }
                ));
            }
        }

        for section in &specs.required_sections {
            if !has_heading(&front_matter.body, section) {
                fail(format!("Missing section \"{}\" in {}", section, spec_rel));
            }
        }

        let resolver = RouteResolver::new(site, RouteStrategy::TopLevelMarkdown);
        for link in extract_markdown_links(&content) {
            let Some(issue) = resolver.resolve(&link.target, &spec_rel) else {
                continue;
            };
            let label = match issue.kind {
                RouteIssueKind::RouteWithoutIndex => "Route has no index file",
                RouteIssueKind::UnresolvedRoute => "Unresolved route",
                RouteIssueKind::UnresolvedRelative => "Unresolved relative route",
            };
            report.add(
                Diagnostic::new(
                    self.name(),
                    Severity::Error,
                    format!("{}: {} (from {})", label, issue.route, spec_rel),
                )
                .with_file(spec_rel.as_str())
                .with_line(link.line)
                .with_code(issue.kind.code()),
            );
        }
    }
}

impl SiteCheck for GameSpecCheck {
    fn name(&self) -> &'static str {
        "specs"
    }

    fn description(&self) -> &'static str {
        "Every manifest entry has a complete spec page with matching front matter"
    }

    fn run(&self, site: &Site) -> CheckResult<CheckReport> {
        let mut report = CheckReport::new(self.name());
        let games = self.load_manifest(site, &mut report);
        self.check_index(site, &mut report);

        for value in &games {
            let entry = GameEntry::from_value(value).unwrap_or_default();
            self.check_entry(site, &mut report, &entry);
        }

        report.info(format!("Spec entries checked: {}", games.len()));
        Ok(report)
    }
}
