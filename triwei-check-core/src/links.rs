//! Link extraction and route resolution
//!
//! Pages reference each other through Liquid `relative_url` filters, raw
//! `href`/`src` attributes and Markdown links. Absolute targets are site
//! routes, relative targets are paths next to the referencing file.

use std::{
    collections::BTreeSet,
    path::{
        Component,
        Path,
    },
    sync::LazyLock,
};

use regex::Regex;

use crate::site::{
    Site,
    normalize,
};

static LIQUID_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*'([^']+)'\s*\|\s*relative_url\s*\}\}")
        .unwrap_or_else(|e| panic!("liquid link regex: {e}"))
});

static HREF_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:href|src)="([^"]+)""#).unwrap_or_else(|e| panic!("href regex: {e}"))
});

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[^\]]*\]\(([^)]+)\)").unwrap_or_else(|e| panic!("markdown link regex: {e}"))
});

static EXTERNAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?:|mailto:|tel:|#)").unwrap_or_else(|e| panic!("scheme regex: {e}"))
});

/// A link target found in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef {
    /// Target exactly as written
    pub target: String,
    /// 1-based line of the match
    pub line:   u32,
}

/// Links from Liquid `{{ '…' | relative_url }}` filters, then `href`/`src`
/// attributes whose value isn't itself a Liquid expression
pub fn extract_template_links(content: &str) -> Vec<LinkRef> {
    let mut links = captures(&LIQUID_LINK, content);
    links.extend(attribute_links(content));
    links
}

/// Links from Markdown `[text](target)` syntax, then `href`/`src` attributes
pub fn extract_markdown_links(content: &str) -> Vec<LinkRef> {
    let mut links = captures(&MARKDOWN_LINK, content);
    links.extend(attribute_links(content));
    links
}

fn attribute_links(content: &str) -> impl Iterator<Item = LinkRef> {
    captures(&HREF_SRC, content).into_iter().filter(|link| !link.target.starts_with("{{"))
}

fn captures(regex: &Regex, content: &str) -> Vec<LinkRef> {
    let mut lines = LineIndex::new(content);
    regex
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| LinkRef {
            target: m.as_str().to_string(),
            line:   lines.line_of(m.start()),
        })
        .collect()
}

/// Incremental byte offset to line number lookup for ascending offsets
struct LineIndex<'a> {
    content: &'a str,
    offset:  usize,
    line:    u32,
}

impl<'a> LineIndex<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            content,
            offset: 0,
            line: 1,
        }
    }

    fn line_of(&mut self, offset: usize) -> u32 {
        if offset < self.offset {
            self.offset = 0;
            self.line = 1;
        }
        let newlines = self.content.as_bytes()[self.offset..offset].iter().filter(|b| **b == b'\n');
        self.line += newlines.count() as u32;
        self.offset = offset;
        self.line
    }
}

/// Whether a target points off-site or at an in-page anchor
pub fn is_external(target: &str) -> bool {
    EXTERNAL.is_match(target)
}

/// Drop a `?query` and `#fragment` suffix
pub fn strip_suffixes(target: &str) -> &str {
    match target.find(['?', '#']) {
        Some(idx) => &target[..idx],
        None => target,
    }
}

/// Set of routes declared through `permalink:` front matter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermalinkSet {
    routes: BTreeSet<String>,
}

impl PermalinkSet {
    /// Set containing only the site root
    pub fn with_root() -> Self {
        let mut set = Self::default();
        set.routes.insert("/".to_string());
        set
    }

    /// Record a permalink, plus its trailing-slash form
    pub fn insert(&mut self, route: &str) {
        let route = route.trim();
        self.routes.insert(route.to_string());
        if !route.ends_with('/') {
            self.routes.insert(format!("{}/", route));
        }
    }

    /// Whether `route` is known with or without a trailing slash
    pub fn contains(&self, route: &str) -> bool {
        if self.routes.contains(route) {
            return true;
        }
        match route.strip_suffix('/') {
            Some(bare) => self.routes.contains(bare),
            None => self.routes.contains(&format!("{}/", route)),
        }
    }

    /// Number of stored routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes are stored
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// How absolute routes that don't map onto a file or directory are settled
#[derive(Debug, Clone)]
pub enum RouteStrategy {
    /// Accept routes declared as permalinks anywhere on the site
    Permalinks(PermalinkSet),
    /// Accept `/x/y` when `x/y.md` exists at the site root
    TopLevelMarkdown,
}

/// Kind of resolution failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteIssueKind {
    /// Absolute route matches nothing
    UnresolvedRoute,
    /// Absolute route is a directory without `index.html`/`index.md`
    RouteWithoutIndex,
    /// Relative path does not exist
    UnresolvedRelative,
}

impl RouteIssueKind {
    /// Diagnostic code
    pub fn code(self) -> &'static str {
        match self {
            RouteIssueKind::UnresolvedRoute => "unresolved-route",
            RouteIssueKind::RouteWithoutIndex => "route-without-index",
            RouteIssueKind::UnresolvedRelative => "unresolved-relative",
        }
    }
}

/// A link that failed to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteIssue {
    /// What went wrong
    pub kind:  RouteIssueKind,
    /// Target as written, surrounding whitespace removed
    pub route: String,
}

/// Resolves link targets against a site checkout
pub struct RouteResolver<'a> {
    site:     &'a Site,
    strategy: RouteStrategy,
    ignored:  Vec<String>,
}

impl<'a> RouteResolver<'a> {
    /// Create a resolver
    pub fn new(site: &'a Site, strategy: RouteStrategy) -> Self {
        Self {
            site,
            strategy,
            ignored: Vec::new(),
        }
    }

    /// Skip these absolute routes entirely
    pub fn with_ignored(mut self, ignored: &[String]) -> Self {
        self.ignored = ignored.to_vec();
        self
    }

    /// Resolve `target` as referenced from the site-relative file `source`.
    ///
    /// Returns `None` when the target resolves or is not checked at all
    /// (external, anchor-only, ignored).
    pub fn resolve(&self, target: &str, source: &str) -> Option<RouteIssue> {
        let route = target.trim();
        if route.is_empty() || is_external(route) {
            return None;
        }
        let path = strip_suffixes(route);
        if path.is_empty() {
            return None;
        }

        let issue = |kind| {
            Some(RouteIssue {
                kind,
                route: route.to_string(),
            })
        };

        if path.starts_with('/') {
            if self.ignored.iter().any(|ignored| ignored == path) {
                return None;
            }
            if let RouteStrategy::Permalinks(permalinks) = &self.strategy {
                if permalinks.contains(path) {
                    return None;
                }
            }

            let rel = path.trim_matches('/');
            if rel.is_empty() || self.site.is_file(rel) {
                return None;
            }
            if self.site.is_dir(rel) {
                let dir = Path::new(rel);
                if self.site.is_file(dir.join("index.html")) || self.site.is_file(dir.join("index.md"))
                {
                    return None;
                }
                return issue(RouteIssueKind::RouteWithoutIndex);
            }
            if matches!(self.strategy, RouteStrategy::TopLevelMarkdown)
                && self.site.is_file(format!("{}.md", rel))
            {
                return None;
            }
            return issue(RouteIssueKind::UnresolvedRoute);
        }

        let base = Path::new(source).parent().unwrap_or_else(|| Path::new(""));
        let resolved = normalize(&base.join(path));
        let escapes_root = matches!(resolved.components().next(), Some(Component::ParentDir));
        if !escapes_root && self.site.abs(&resolved).exists() {
            None
        } else {
            issue(RouteIssueKind::UnresolvedRelative)
        }
    }
}
