//! Diagnostic filtering and grouping functionality
//!
//! Filtering only narrows what is displayed. Exit status is always derived
//! from the unfiltered collection.

use std::collections::{
    BTreeMap,
    HashSet,
};

use regex::Regex;

use crate::{
    diagnostics::{
        Diagnostic,
        DiagnosticCollection,
        Severity,
    },
    error::{
        CheckError,
        CheckResult,
    },
};

/// Filter criteria for diagnostics
#[derive(Debug, Clone, Default)]
pub struct DiagnosticFilter {
    /// Filter by severity levels
    pub severities:    Option<HashSet<Severity>>,
    /// Filter by check name
    pub checks:        Option<HashSet<String>>,
    /// Filter by file patterns (glob-style)
    pub file_patterns: Option<Vec<String>>,
}

/// Grouping options for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    /// Group by check name
    Check,
    /// Group by file path
    File,
    /// Group by severity level
    Severity,
    /// No grouping (flat list)
    None,
}

impl GroupBy {
    /// Parse a grouping name as accepted on the command line
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "check" => Some(GroupBy::Check),
            "file" => Some(GroupBy::File),
            "severity" => Some(GroupBy::Severity),
            "none" => Some(GroupBy::None),
            _ => None,
        }
    }
}

/// Sorting options for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Check, then file, then line
    Location,
    /// Errors first
    Severity,
    /// Keep the order the checks reported in
    None,
}

/// Filtering and grouping options
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Filter criteria
    pub filter:   DiagnosticFilter,
    /// Grouping method
    pub group_by: GroupBy,
    /// Sorting method
    pub sort_by:  SortBy,
    /// Limit number of results
    pub limit:    Option<usize>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            filter:   DiagnosticFilter::default(),
            group_by: GroupBy::None,
            sort_by:  SortBy::None,
            limit:    None,
        }
    }
}

impl FilterOptions {
    /// Whether these options change the output at all
    pub fn is_active(&self) -> bool {
        self.filter.severities.is_some()
            || self.filter.checks.is_some()
            || self.filter.file_patterns.is_some()
            || self.group_by != GroupBy::None
            || self.sort_by != SortBy::None
            || self.limit.is_some()
    }
}

/// Grouped diagnostics result
#[derive(Debug)]
pub struct GroupedDiagnostics {
    /// Groups with their diagnostics, ordered by key
    pub groups:      BTreeMap<String, Vec<Diagnostic>>,
    /// Total number of diagnostics across all groups
    pub total_count: usize,
    /// Number of groups
    pub group_count: usize,
    /// Grouping method used
    pub grouped_by:  GroupBy,
}

/// Diagnostic filtering and grouping engine
#[derive(Debug, Default)]
pub struct DiagnosticProcessor;

impl DiagnosticProcessor {
    /// Create a new diagnostic processor
    pub fn new() -> Self {
        Self
    }

    /// Apply filtering, sorting, limiting and grouping to a collection
    pub fn process(
        &self,
        collection: &DiagnosticCollection,
        options: &FilterOptions,
    ) -> CheckResult<GroupedDiagnostics> {
        let filtered = self.apply_filters(&collection.diagnostics, &options.filter)?;
        let sorted = self.apply_sorting(filtered, options.sort_by);
        let limited = match options.limit {
            Some(limit) => sorted.into_iter().take(limit).collect(),
            None => sorted,
        };
        Ok(self.apply_grouping(limited, options.group_by))
    }

    /// Apply filter criteria to diagnostics
    fn apply_filters(
        &self,
        diagnostics: &[Diagnostic],
        filter: &DiagnosticFilter,
    ) -> CheckResult<Vec<Diagnostic>> {
        let file_patterns = filter
            .file_patterns
            .as_ref()
            .map(|patterns| patterns.iter().map(|p| compile_file_pattern(p)).collect::<CheckResult<Vec<_>>>())
            .transpose()?;

        let filtered = diagnostics
            .iter()
            .filter(|d| filter.severities.as_ref().is_none_or(|s| s.contains(&d.severity)))
            .filter(|d| filter.checks.as_ref().is_none_or(|c| c.contains(&d.check)))
            .filter(|d| match (&file_patterns, &d.file) {
                (None, _) => true,
                (Some(_), None) => false,
                (Some(patterns), Some(file)) => patterns.iter().any(|re| re.is_match(file)),
            })
            .cloned()
            .collect();

        Ok(filtered)
    }

    /// Apply sorting to diagnostics
    fn apply_sorting(&self, mut diagnostics: Vec<Diagnostic>, sort_by: SortBy) -> Vec<Diagnostic> {
        match sort_by {
            SortBy::Location => {
                diagnostics.sort_by(|a, b| {
                    a.check.cmp(&b.check).then_with(|| a.file.cmp(&b.file)).then_with(|| a.line.cmp(&b.line))
                });
            },
            SortBy::Severity => {
                diagnostics.sort_by_key(|d| severity_order(d.severity));
            },
            SortBy::None => {},
        }
        diagnostics
    }

    /// Apply grouping to diagnostics
    fn apply_grouping(&self, diagnostics: Vec<Diagnostic>, group_by: GroupBy) -> GroupedDiagnostics {
        let total_count = diagnostics.len();
        let mut groups: BTreeMap<String, Vec<Diagnostic>> = BTreeMap::new();

        match group_by {
            GroupBy::Check => {
                for diagnostic in diagnostics {
                    groups.entry(diagnostic.check.clone()).or_default().push(diagnostic);
                }
            },
            GroupBy::File => {
                for diagnostic in diagnostics {
                    let key = diagnostic.file.clone().unwrap_or_else(|| "(site)".to_string());
                    groups.entry(key).or_default().push(diagnostic);
                }
            },
            GroupBy::Severity => {
                for diagnostic in diagnostics {
                    groups.entry(diagnostic.severity.to_string()).or_default().push(diagnostic);
                }
            },
            GroupBy::None => {
                groups.insert("all".to_string(), diagnostics);
            },
        }

        let group_count = groups.len();
        GroupedDiagnostics {
            groups,
            total_count,
            group_count,
            grouped_by: group_by,
        }
    }
}

/// Get severity order for sorting (errors first)
fn severity_order(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 0,
        Severity::Warning => 1,
        Severity::Info => 2,
    }
}

/// Compile a glob-style file filter (`*` any run, `?` one character)
fn compile_file_pattern(pattern: &str) -> CheckResult<Regex> {
    let mut regex = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            other => regex.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    regex.push('$');
    Regex::new(&regex).map_err(|e| CheckError::Pattern(format!("{}: {}", pattern, e)))
}

/// Builder for filter options
#[derive(Debug, Default)]
pub struct FilterOptionsBuilder {
    options: FilterOptions,
}

impl FilterOptionsBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by severities
    pub fn severities(mut self, severities: &[Severity]) -> Self {
        self.options.filter.severities = Some(severities.iter().copied().collect());
        self
    }

    /// Filter by check names
    pub fn checks(mut self, checks: &[String]) -> Self {
        self.options.filter.checks = Some(checks.iter().cloned().collect());
        self
    }

    /// Filter by file patterns
    pub fn file_patterns(mut self, patterns: &[String]) -> Self {
        self.options.filter.file_patterns = Some(patterns.to_vec());
        self
    }

    /// Group by criterion
    pub fn group_by(mut self, group_by: GroupBy) -> Self {
        self.options.group_by = group_by;
        self
    }

    /// Sort by criterion
    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.options.sort_by = sort_by;
        self
    }

    /// Limit results
    pub fn limit(mut self, limit: usize) -> Self {
        self.options.limit = Some(limit);
        self
    }

    /// Build the filter options
    pub fn build(self) -> FilterOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn collection() -> DiagnosticCollection {
        let mut collection = DiagnosticCollection::new(Path::new("/site"), "all");
        let diagnostics = [
            ("links", Some("index.md"), Severity::Error, "Unresolved internal route: /x (from index.md)"),
            ("games", Some("games/linreg/index.html"), Severity::Warning, "No inline script found"),
            ("games", None, Severity::Info, "Inline scripts parsed: 0"),
            ("specs", Some("games/specs/linreg.md"), Severity::Error, "Missing section"),
        ];
        for (check, file, severity, message) in diagnostics {
            let mut diagnostic = Diagnostic::new(check, severity, message);
            diagnostic.file = file.map(str::to_string);
            collection.add_diagnostic(diagnostic);
        }
        collection
    }

    #[test]
    fn test_severity_filtering() {
        let options = FilterOptionsBuilder::new().severities(&[Severity::Error]).build();
        let result = DiagnosticProcessor::new().process(&collection(), &options).unwrap();
        assert_eq!(result.total_count, 2);
        assert!(result.groups["all"].iter().all(|d| d.severity == Severity::Error));
    }

    #[test]
    fn test_check_filtering() {
        let options = FilterOptionsBuilder::new().checks(&["games".to_string()]).build();
        let result = DiagnosticProcessor::new().process(&collection(), &options).unwrap();
        assert_eq!(result.total_count, 2);
        assert_eq!(result.groups["all"][0].check, "games");
    }

    #[test]
    fn test_file_pattern_filtering() {
        let options = FilterOptionsBuilder::new().file_patterns(&["games/*.md".to_string()]).build();
        let result = DiagnosticProcessor::new().process(&collection(), &options).unwrap();
        assert_eq!(result.total_count, 1);
        assert_eq!(result.groups["all"][0].file.as_deref(), Some("games/specs/linreg.md"));
    }

    #[test]
    fn test_grouping_and_limit() {
        let options = FilterOptionsBuilder::new().group_by(GroupBy::Check).build();
        let result = DiagnosticProcessor::new().process(&collection(), &options).unwrap();
        assert_eq!(result.group_count, 3);
        assert_eq!(result.groups["games"].len(), 2);
        assert_eq!(result.groups.keys().next().map(String::as_str), Some("games"));

        let options =
            FilterOptionsBuilder::new().sort_by(SortBy::Severity).group_by(GroupBy::File).limit(2).build();
        let result = DiagnosticProcessor::new().process(&collection(), &options).unwrap();
        assert_eq!(result.total_count, 2);
        assert!(result.groups.contains_key("index.md"));
        assert!(result.groups.contains_key("games/specs/linreg.md"));
    }

    #[test]
    fn test_pattern_matching() {
        assert!(compile_file_pattern("*.md").unwrap().is_match("games/specs/a.md"));
        assert!(compile_file_pattern("games/?/index.html").unwrap().is_match("games/a/index.html"));
        assert!(!compile_file_pattern("*.md").unwrap().is_match("games/a/index.html"));
        assert!(!FilterOptions::default().is_active());
    }
}
