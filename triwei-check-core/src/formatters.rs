//! Output formatters for diagnostic collections
//!
//! The human format keeps the line protocol CI logs are grepped for:
//!
//! ```text
//! Scanned files: 12
//! INFO: ...
//! WARN: ...
//! FAIL: 2 issue(s) found.
//! ERROR: ...
//! ```
//!
//! Machine formats never carry color codes or banner text.

use std::fmt::Write as _;

use colored::{
    ColoredString,
    Colorize,
};

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
    filtering::GroupedDiagnostics,
};

/// Output format for check results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Line protocol with optional colors
    #[default]
    Human,
    /// One pretty-printed JSON document
    Json,
    /// One JSON object per diagnostic per line
    JsonLines,
}

impl OutputFormat {
    /// Parse a format name
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "human" | "text" => Some(OutputFormat::Human),
            "json" => Some(OutputFormat::Json),
            "json-lines" | "jsonl" | "jsonlines" => Some(OutputFormat::JsonLines),
            _ => None,
        }
    }

    /// Whether the format is meant for other programs
    pub fn is_machine(self) -> bool {
        !matches!(self, OutputFormat::Human)
    }
}

/// Human-readable renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct HumanFormatter {
    use_color:      bool,
    show_locations: bool,
}

impl HumanFormatter {
    /// Create a renderer
    pub fn new(use_color: bool) -> Self {
        Self {
            use_color,
            show_locations: false,
        }
    }

    /// Append `[file:line]` to diagnostics that carry a line number
    pub fn with_locations(mut self, show: bool) -> Self {
        self.show_locations = show;
        self
    }

    /// Render a full collection, one block per check in run order
    pub fn render(&self, collection: &DiagnosticCollection) -> String {
        let mut out = String::new();

        for check in &collection.checks {
            for stat in collection.stats.iter().filter(|s| &s.check == check) {
                let _ = writeln!(out, "{}: {}", stat.label, stat.value);
            }

            let diagnostics = collection.by_check(check);
            for severity in [Severity::Info, Severity::Warning] {
                for diagnostic in diagnostics.iter().filter(|d| d.severity == severity) {
                    let _ = writeln!(out, "{}", self.line(diagnostic));
                }
            }

            let errors: Vec<_> =
                diagnostics.iter().filter(|d| d.severity == Severity::Error).collect();
            if errors.is_empty() {
                let pass = collection
                    .pass_message(check)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("PASS: {}", check));
                let _ = writeln!(out, "{}", self.paint(&pass, |s| s.green().bold()));
            } else {
                let fail = format!("FAIL: {} issue(s) found.", errors.len());
                let _ = writeln!(out, "{}", self.paint(&fail, |s| s.red().bold()));
                for diagnostic in errors {
                    let _ = writeln!(out, "{}", self.line(diagnostic));
                }
            }
        }

        if collection.checks.len() > 1 {
            let summary = &collection.summary;
            let _ = writeln!(
                out,
                "Summary: {} error(s), {} warning(s) across {} check(s)",
                summary.errors,
                summary.warnings,
                collection.checks.len()
            );
        }

        out
    }

    /// Render a filtered and grouped view
    pub fn render_grouped(&self, grouped: &GroupedDiagnostics) -> String {
        let mut out = String::new();
        let single = grouped.group_count == 1 && grouped.groups.contains_key("all");

        for (key, diagnostics) in &grouped.groups {
            if !single {
                let header = format!("== {} ({}) ==", key, diagnostics.len());
                let _ = writeln!(out, "{}", self.paint(&header, |s| s.bold()));
            }
            for diagnostic in diagnostics {
                let _ = writeln!(out, "{}", self.line(diagnostic));
            }
        }
        let _ = writeln!(out, "Shown: {} diagnostic(s)", grouped.total_count);
        out
    }

    /// One `LEVEL: message` line
    pub fn line(&self, diagnostic: &Diagnostic) -> String {
        let label = format!("{}:", diagnostic.severity.label());
        let label = match diagnostic.severity {
            Severity::Error => self.paint(&label, |s| s.red().bold()),
            Severity::Warning => self.paint(&label, |s| s.yellow().bold()),
            Severity::Info => self.paint(&label, |s| s.cyan()),
        };

        let mut line = format!("{} {}", label, diagnostic.message);
        if self.show_locations && diagnostic.line.is_some() {
            if let Some(location) = diagnostic.location() {
                let _ = write!(line, " [{}]", location);
            }
        }
        line
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.use_color { style(text).to_string() } else { text.to_string() }
    }
}

/// Pretty JSON document for a finalized collection
pub fn render_json(collection: &DiagnosticCollection) -> CheckResult<String> {
    serde_json::to_string_pretty(collection).map_err(|e| CheckError::Json {
        path:    "<stdout>".to_string(),
        message: e.to_string(),
    })
}

/// One compact JSON object per diagnostic
pub fn render_json_lines<'a>(
    diagnostics: impl IntoIterator<Item = &'a Diagnostic>,
) -> CheckResult<String> {
    let mut out = String::new();
    for diagnostic in diagnostics {
        let line = serde_json::to_string(diagnostic).map_err(|e| CheckError::Json {
            path:    "<stdout>".to_string(),
            message: e.to_string(),
        })?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{
        diagnostics::CheckReport,
        filtering::{
            DiagnosticProcessor,
            FilterOptionsBuilder,
            GroupBy,
        },
    };

    fn sample() -> DiagnosticCollection {
        let mut collection = DiagnosticCollection::new(Path::new("/site"), "all");

        let mut links = CheckReport::new("links");
        links.stat("Scanned files", 4);
        links.warning("Scan root missing: _layouts");
        links.error("Unresolved internal route: /nope/ (from index.md)").file = Some("index.md".to_string());
        collection.add_report(links);

        let mut dist = CheckReport::new("dist");
        dist.pass_message = Some("dist size OK: 3 MB <= 300 MB".to_string());
        collection.add_report(dist);

        collection.finalize(5)
    }

    #[test]
    fn test_human_line_protocol() {
        let text = HumanFormatter::new(false).render(&sample());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Scanned files: 4",
                "WARN: Scan root missing: _layouts",
                "FAIL: 1 issue(s) found.",
                "ERROR: Unresolved internal route: /nope/ (from index.md)",
                "dist size OK: 3 MB <= 300 MB",
                "Summary: 1 error(s), 1 warning(s) across 2 check(s)",
            ]
        );
    }

    #[test]
    fn test_default_pass_line() {
        let mut collection = DiagnosticCollection::new(Path::new("/site"), "specs");
        let mut report = CheckReport::new("specs");
        report.info("Spec entries checked: 0");
        collection.add_report(report);
        let text = HumanFormatter::new(false).render(&collection.finalize(0));
        assert_eq!(text, "INFO: Spec entries checked: 0\nPASS: specs\n");
    }

    #[test]
    fn test_locations_only_when_requested() {
        let diagnostic = Diagnostic::new("games", Severity::Error, "JavaScript parse failed")
            .with_file("games/a/index.html")
            .with_line(12);
        assert_eq!(HumanFormatter::new(false).line(&diagnostic), "ERROR: JavaScript parse failed");
        assert_eq!(
            HumanFormatter::new(false).with_locations(true).line(&diagnostic),
            "ERROR: JavaScript parse failed [games/a/index.html:12]"
        );
    }

    #[test]
    fn test_grouped_rendering() {
        let options = FilterOptionsBuilder::new().group_by(GroupBy::Severity).build();
        let grouped = DiagnosticProcessor::new().process(&sample(), &options).unwrap();
        let text = HumanFormatter::new(false).render_grouped(&grouped);
        assert!(text.contains("== error (1) =="));
        assert!(text.contains("== warning (1) =="));
        assert!(text.ends_with("Shown: 2 diagnostic(s)\n"));
    }

    #[test]
    fn test_machine_formats() {
        let collection = sample();
        let json: serde_json::Value = serde_json::from_str(&render_json(&collection).unwrap()).unwrap();
        assert_eq!(json["summary"]["errors"], 1);
        assert_eq!(json["checks"][1], "dist");

        let lines = render_json_lines(&collection.diagnostics).unwrap();
        assert_eq!(lines.lines().count(), 2);
        assert!(!lines.contains('\u{1b}'));
        assert_eq!(OutputFormat::parse("json-lines"), Some(OutputFormat::JsonLines));
        assert!(OutputFormat::Json.is_machine());
    }
}
