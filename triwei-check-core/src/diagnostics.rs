//! Unified diagnostic system for site check reporting
//!
//! Every check produces a [`CheckReport`]. Reports are merged into a
//! [`DiagnosticCollection`], which is what formatters render and what the
//! exit status is derived from.

use std::{
    collections::HashSet,
    fmt,
    path::Path,
};

use serde::{
    Deserialize,
    Serialize,
};

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Content problem that fails the check
    Error,
    /// Problem that should be addressed but doesn't fail the check
    Warning,
    /// Informational message
    Info,
}

impl Severity {
    /// Line prefix used by the human output protocol
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
            Severity::Info => "INFO",
        }
    }

    /// Parse a severity name as accepted on the command line
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "error" | "errors" => Some(Severity::Error),
            "warning" | "warn" | "warnings" => Some(Severity::Warning),
            "info" | "infos" => Some(Severity::Info),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Individual diagnostic item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Check that produced this diagnostic (e.g. "links", "specs")
    pub check:    String,
    /// File path relative to the site root, when the problem has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file:     Option<String>,
    /// 1-indexed line within `file`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line:     Option<u32>,
    /// Severity level
    pub severity: Severity,
    /// Optional machine-readable code (e.g. "unresolved-route")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code:     Option<String>,
    /// Human-readable message
    pub message:  String,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(check: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            file: None,
            line: None,
            severity,
            code: None,
            message: message.into(),
        }
    }

    /// Attach the file the diagnostic refers to
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attach a 1-indexed line number
    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Set diagnostic code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// `file:line` location string, if any
    pub fn location(&self) -> Option<String> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            (Some(file), None) => Some(file.clone()),
            _ => None,
        }
    }
}

/// Plain counter reported by a check ("Scanned files: 12")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckStat {
    /// Check that reported the counter
    pub check: String,
    /// Counter label
    pub label: String,
    /// Counter value
    pub value: u64,
}

/// Result of a single check run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    /// Check name
    pub check:       String,
    /// Counters in the order they were recorded
    pub stats:       Vec<CheckStat>,
    /// Diagnostics in the order they were found
    pub diagnostics: Vec<Diagnostic>,
    /// Custom success line, replacing the default `PASS: <check>`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_message: Option<String>,
    /// Time taken by the check
    pub duration_ms: u64,
}

impl CheckReport {
    /// Create an empty report for `check`
    pub fn new(check: impl Into<String>) -> Self {
        Self {
            check:        check.into(),
            stats:        Vec::new(),
            diagnostics:  Vec::new(),
            pass_message: None,
            duration_ms:  0,
        }
    }

    /// Record an error
    pub fn error(&mut self, message: impl Into<String>) -> &mut Diagnostic {
        self.push(Severity::Error, message)
    }

    /// Record a warning
    pub fn warning(&mut self, message: impl Into<String>) -> &mut Diagnostic {
        self.push(Severity::Warning, message)
    }

    /// Record an informational message
    pub fn info(&mut self, message: impl Into<String>) -> &mut Diagnostic {
        self.push(Severity::Info, message)
    }

    /// Record a counter
    pub fn stat(&mut self, label: impl Into<String>, value: usize) {
        self.stats.push(CheckStat {
            check: self.check.clone(),
            label: label.into(),
            value: value as u64,
        });
    }

    /// Add a fully built diagnostic, re-tagging it with this check's name
    pub fn add(&mut self, mut diagnostic: Diagnostic) {
        diagnostic.check = self.check.clone();
        self.diagnostics.push(diagnostic);
    }

    fn push(&mut self, severity: Severity, message: impl Into<String>) -> &mut Diagnostic {
        self.diagnostics.push(Diagnostic::new(self.check.clone(), severity, message));
        let last = self.diagnostics.len() - 1;
        &mut self.diagnostics[last]
    }

    /// Diagnostics of one severity
    pub fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.severity == severity)
    }

    /// Number of error diagnostics
    pub fn error_count(&self) -> usize {
        self.by_severity(Severity::Error).count()
    }

    /// Whether the check passed
    pub fn is_success(&self) -> bool {
        self.error_count() == 0
    }

    /// Look up a counter by label
    pub fn stat_value(&self, label: &str) -> Option<u64> {
        self.stats.iter().find(|s| s.label == label).map(|s| s.value)
    }
}

/// Summary statistics for a diagnostic collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticSummary {
    /// Total number of diagnostics
    pub total:                  usize,
    /// Number of errors
    pub errors:                 usize,
    /// Number of warnings
    pub warnings:               usize,
    /// Number of info messages
    pub infos:                  usize,
    /// Number of files with diagnostics
    pub files_with_diagnostics: usize,
    /// Number of checks with at least one error
    pub checks_failed:          usize,
    /// Duration of the whole run in milliseconds
    pub duration_ms:            u64,
}

impl DiagnosticSummary {
    /// Create summary from diagnostic collection
    pub fn from_diagnostics(diagnostics: &[Diagnostic], duration_ms: u64) -> Self {
        let mut errors = 0;
        let mut warnings = 0;
        let mut infos = 0;
        let mut files = HashSet::new();
        let mut failed_checks = HashSet::new();

        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => {
                    errors += 1;
                    failed_checks.insert(diagnostic.check.as_str());
                },
                Severity::Warning => warnings += 1,
                Severity::Info => infos += 1,
            }
            if let Some(file) = &diagnostic.file {
                files.insert(file.as_str());
            }
        }

        Self {
            total: diagnostics.len(),
            errors,
            warnings,
            infos,
            files_with_diagnostics: files.len(),
            checks_failed: failed_checks.len(),
            duration_ms,
        }
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Check if the run was successful (no errors)
    pub fn is_success(&self) -> bool {
        !self.has_errors()
    }
}

/// Collection of check results with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticCollection {
    /// Version of diagnostic format
    pub version:      String,
    /// Timestamp when diagnostics were generated
    pub timestamp:    String,
    /// Site root path
    pub site_root:    String,
    /// Command that generated these diagnostics
    pub command:      String,
    /// Checks that ran, in order
    pub checks:       Vec<String>,
    /// Counters reported by the checks
    pub stats:        Vec<CheckStat>,
    /// Individual diagnostics
    pub diagnostics:  Vec<Diagnostic>,
    /// Custom pass lines keyed by check
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub pass_messages: Vec<(String, String)>,
    /// Summary statistics
    pub summary:      DiagnosticSummary,
}

impl DiagnosticCollection {
    /// Create a new diagnostic collection
    pub fn new(site_root: &Path, command: impl Into<String>) -> Self {
        Self {
            version:       "1.0".to_string(),
            timestamp:     chrono::Utc::now().to_rfc3339(),
            site_root:     site_root.to_string_lossy().to_string(),
            command:       command.into(),
            checks:        Vec::new(),
            stats:         Vec::new(),
            diagnostics:   Vec::new(),
            pass_messages: Vec::new(),
            summary:       DiagnosticSummary::default(),
        }
    }

    /// Merge a check report into the collection
    pub fn add_report(&mut self, report: CheckReport) {
        self.checks.push(report.check.clone());
        if let Some(message) = report.pass_message {
            self.pass_messages.push((report.check.clone(), message));
        }
        self.stats.extend(report.stats);
        self.diagnostics.extend(report.diagnostics);
    }

    /// Add a single diagnostic
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Finalize the collection with timing information
    pub fn finalize(mut self, duration_ms: u64) -> Self {
        self.summary = DiagnosticSummary::from_diagnostics(&self.diagnostics, duration_ms);
        self
    }

    /// Get diagnostics by severity
    pub fn by_severity(&self, severity: Severity) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == severity).collect()
    }

    /// Get diagnostics produced by one check
    pub fn by_check(&self, check: &str) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.check == check).collect()
    }

    /// Custom pass line registered by a check
    pub fn pass_message(&self, check: &str) -> Option<&str> {
        self.pass_messages
            .iter()
            .find(|(name, _)| name == check)
            .map(|(_, message)| message.as_str())
    }

    /// Check if collection has any errors
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Check if the run was successful
    pub fn is_success(&self) -> bool {
        !self.has_errors()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_diagnostic_creation() {
        let diagnostic = Diagnostic::new("links", Severity::Error, "Unresolved internal route: /x")
            .with_file("index.md")
            .with_line(4)
            .with_code("unresolved-route");

        assert_eq!(diagnostic.file.as_deref(), Some("index.md"));
        assert_eq!(diagnostic.location().as_deref(), Some("index.md:4"));
        assert_eq!(diagnostic.code.as_deref(), Some("unresolved-route"));
    }

    #[test]
    fn test_report_helpers() {
        let mut report = CheckReport::new("specs");
        report.error("Missing specs index: games/specs/index.md");
        report.warning("something odd").file = Some("games/specs/a.md".to_string());
        report.stat("Spec entries checked", 3);

        assert_eq!(report.error_count(), 1);
        assert!(!report.is_success());
        assert_eq!(report.stat_value("Spec entries checked"), Some(3));
        assert_eq!(report.diagnostics[1].check, "specs");
    }

    #[test]
    fn test_diagnostic_collection() {
        let mut collection = DiagnosticCollection::new(&PathBuf::from("/site"), "all");

        let mut links = CheckReport::new("links");
        links.error("broken").file = Some("index.md".to_string());
        let mut games = CheckReport::new("games");
        games.warning("Game folder not listed in manifest: games/common");
        games.pass_message = Some("custom".to_string());

        collection.add_report(links);
        collection.add_report(games);
        let collection = collection.finalize(10);

        assert_eq!(collection.checks, vec!["links", "games"]);
        assert_eq!(collection.summary.total, 2);
        assert_eq!(collection.summary.errors, 1);
        assert_eq!(collection.summary.warnings, 1);
        assert_eq!(collection.summary.files_with_diagnostics, 1);
        assert_eq!(collection.summary.checks_failed, 1);
        assert_eq!(collection.pass_message("games"), Some("custom"));
        assert!(collection.has_errors());
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("Error"), Some(Severity::Error));
        assert_eq!(Severity::parse("warn"), Some(Severity::Warning));
        assert_eq!(Severity::parse("hint"), None);
    }
}
