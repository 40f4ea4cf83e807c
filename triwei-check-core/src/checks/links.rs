//! Broken link detection across layouts, includes, games and top pages

use std::collections::HashSet;

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
    front_matter::find_permalink,
    links::{
        PermalinkSet,
        RouteIssueKind,
        RouteResolver,
        RouteStrategy,
        extract_template_links,
    },
    site::Site,
};

/// Checks that every template and HTML link resolves
#[derive(Debug, Clone, Copy, Default)]
pub struct BrokenLinkCheck;

impl SiteCheck for BrokenLinkCheck {
    fn name(&self) -> &'static str {
        "links"
    }

    fn description(&self) -> &'static str {
        "Template and HTML links resolve to a permalink, a file or an indexed directory"
    }

    fn run(&self, site: &Site) -> CheckResult<CheckReport> {
        let config = &site.config().links;
        let mut report = CheckReport::new(self.name());

        let mut files = Vec::new();
        for dir in &config.scan_roots {
            if !site.is_dir(dir) {
                report.warning(format!("Scan root missing: {}", dir));
                continue;
            }
            files.extend(site.list_files(dir, &[])?.into_iter().filter(|f| is_page(f)));
        }
        files.extend(config.single_files.iter().filter(|f| site.is_file(f.as_str())).cloned());

        let mut seen = HashSet::new();
        files.retain(|f| seen.insert(f.clone()));

        let mut pages = Vec::with_capacity(files.len());
        for file in &files {
            if let Some(content) = read_or_report(site, &mut report, file) {
                pages.push((file.as_str(), content));
            }
        }

        let mut permalinks = PermalinkSet::with_root();
        for (_, content) in &pages {
            if let Some(route) = find_permalink(content) {
                permalinks.insert(route);
            }
        }
        let known_permalinks = permalinks.len();

        let resolver = RouteResolver::new(site, RouteStrategy::Permalinks(permalinks))
            .with_ignored(&config.ignored_routes);

        let mut link_count = 0;
        for (file, content) in &pages {
            let links = extract_template_links(content);
            link_count += links.len();
            for link in links {
                let Some(issue) = resolver.resolve(&link.target, file) else {
                    continue;
                };
                let message = match issue.kind {
                    RouteIssueKind::RouteWithoutIndex => {
                        format!("Route directory has no index: {} (from {})", issue.route, file)
                    },
                    RouteIssueKind::UnresolvedRoute => {
                        format!("Unresolved internal route: {} (from {})", issue.route, file)
                    },
                    RouteIssueKind::UnresolvedRelative => {
                        format!("Unresolved relative path: {} (from {})", issue.route, file)
                    },
                };
                report.add(
                    Diagnostic::new(self.name(), Severity::Error, message)
                        .with_file(*file)
                        .with_line(link.line)
                        .with_code(issue.kind.code()),
                );
            }
        }

        report.stat("Scanned files", files.len());
        report.stat("Detected links", link_count);
        report.stat("Known permalinks", known_permalinks);
        Ok(report)
    }
}

fn is_page(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".html") || lower.ends_with(".md")
}
