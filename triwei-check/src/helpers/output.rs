//! Console output manager
//!
//! Owns the output format and color decision so command handlers never
//! print banner text into machine-readable output.

use anyhow::{
    Context,
    Result,
};
use colored::Colorize;
use triwei_check_core::{
    diagnostics::DiagnosticCollection,
    filtering::{
        DiagnosticProcessor,
        FilterOptions,
    },
    formatters::{
        HumanFormatter,
        OutputFormat,
        render_json,
        render_json_lines,
    },
};

/// Writes status lines and check results in the selected format
#[derive(Debug, Clone)]
pub struct OutputManager {
    format:     OutputFormat,
    use_colors: bool,
    verbose:    bool,
}

impl OutputManager {
    /// Create an output manager without colors
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            use_colors: false,
            verbose: false,
        }
    }

    /// Enable or disable ANSI colors (ignored for machine formats)
    pub fn with_color(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors && !self.format.is_machine();
        self
    }

    /// Enable verbose lines
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn is_machine(&self) -> bool {
        self.format.is_machine()
    }

    /// Bold section header
    pub fn header(&self, message: &str) {
        if self.is_machine() {
            return;
        }
        if self.use_colors {
            println!("{}", message.bold());
        } else {
            println!("{}", message);
        }
    }

    /// Plain status line
    pub fn info(&self, message: &str) {
        if !self.is_machine() {
            println!("{}", message);
        }
    }

    /// Warning on stderr
    pub fn warning(&self, message: &str) {
        if self.use_colors {
            eprintln!("{} {}", "warning:".yellow().bold(), message);
        } else {
            eprintln!("warning: {}", message);
        }
    }

    /// Error on stderr, shown in every format
    pub fn error(&self, message: &str) {
        if self.use_colors {
            eprintln!("{} {}", "error:".red().bold(), message);
        } else {
            eprintln!("error: {}", message);
        }
    }

    /// Green completion line
    pub fn success(&self, message: &str) {
        if self.is_machine() {
            return;
        }
        if self.use_colors {
            println!("{}", message.green());
        } else {
            println!("{}", message);
        }
    }

    /// Line shown only with `--verbose` in human output
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.is_machine() {
            if self.use_colors {
                println!("{}", message.dimmed());
            } else {
                println!("{}", message);
            }
        }
    }

    /// Print a finalized collection, applying display filters when any are set
    pub fn emit_collection(&self, collection: &DiagnosticCollection, options: &FilterOptions) -> Result<()> {
        let grouped = if options.is_active() {
            Some(DiagnosticProcessor::new().process(collection, options).context("Failed to filter diagnostics")?)
        } else {
            None
        };

        match self.format {
            OutputFormat::Human => {
                let formatter = HumanFormatter::new(self.use_colors).with_locations(self.verbose);
                match &grouped {
                    Some(grouped) => print!("{}", formatter.render_grouped(grouped)),
                    None => print!("{}", formatter.render(collection)),
                }
            },
            OutputFormat::Json => {
                let text = match grouped {
                    Some(grouped) => {
                        let mut filtered = collection.clone();
                        filtered.diagnostics = grouped.groups.into_values().flatten().collect();
                        render_json(&filtered)?
                    },
                    None => render_json(collection)?,
                };
                println!("{}", text);
            },
            OutputFormat::JsonLines => {
                let text = match &grouped {
                    Some(grouped) => render_json_lines(grouped.groups.values().flatten())?,
                    None => render_json_lines(&collection.diagnostics)?,
                };
                print!("{}", text);
            },
        }
        Ok(())
    }
}
