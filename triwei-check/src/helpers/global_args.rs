//! Global argument propagation helper
//!
//! Collects the arguments shared by every subcommand in one place so each
//! handler sees the same output, root and filter settings.

use anyhow::Result;
use atty::Stream;
use triwei_check_core::{
    diagnostics::Severity,
    filtering::{
        FilterOptions,
        FilterOptionsBuilder,
        GroupBy,
        SortBy,
    },
    formatters::OutputFormat,
};

use super::OutputManager;
use crate::{
    Cli,
    GroupByArg,
    OutputFormatArg,
};

impl From<OutputFormatArg> for OutputFormat {
    fn from(format: OutputFormatArg) -> Self {
        match format {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::JsonLines => OutputFormat::JsonLines,
        }
    }
}

impl From<GroupByArg> for GroupBy {
    fn from(group_by: GroupByArg) -> Self {
        match group_by {
            GroupByArg::Check => GroupBy::Check,
            GroupByArg::File => GroupBy::File,
            GroupByArg::Severity => GroupBy::Severity,
        }
    }
}

/// Parse severity strings to Severity enum
fn parse_severities(severity_strings: &[String]) -> Result<Vec<Severity>> {
    let mut severities = Vec::new();
    for s in severity_strings {
        match Severity::parse(s) {
            Some(severity) => severities.push(severity),
            None => anyhow::bail!("Invalid severity: {}. Valid values: error, warning, info", s),
        }
    }
    Ok(severities)
}

/// Whether human output on stdout should carry colors
pub fn should_use_colors(output_format: OutputFormat, no_color: bool) -> bool {
    match output_format {
        OutputFormat::Human => !no_color && atty::is(Stream::Stdout),
        OutputFormat::Json | OutputFormat::JsonLines => false,
    }
}

/// Arguments shared by all commands
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    pub verbose: bool,

    /// Explicit site root
    pub root: Option<String>,

    /// Explicit config file
    pub config: Option<String>,

    /// Output format for check results
    pub output_format: OutputFormat,

    /// Output manager configured with format and color settings
    pub output: OutputManager,

    pub filter_severity: Option<Vec<String>>,
    pub filter_check:    Option<Vec<String>>,
    pub filter_file:     Option<Vec<String>>,
    pub group_by:        Option<GroupBy>,
    pub limit:           Option<usize>,
}

impl GlobalArgs {
    /// Create GlobalArgs from CLI struct
    pub fn from_cli(cli: &Cli) -> Self {
        let output_format: OutputFormat = cli.output.into();
        let output = OutputManager::new(output_format)
            .with_color(should_use_colors(output_format, cli.no_color))
            .with_verbose(cli.verbose);

        Self {
            verbose: cli.verbose,
            root: cli.root.clone(),
            config: cli.config.clone(),
            output_format,
            output,
            filter_severity: cli.filter_severity.clone(),
            filter_check: cli.filter_check.clone(),
            filter_file: cli.filter_file.clone(),
            group_by: cli.group_by.map(Into::into),
            limit: cli.limit,
        }
    }

    /// Build display filter options from the filter arguments
    pub fn build_filter_options(&self) -> Result<FilterOptions> {
        let mut builder = FilterOptionsBuilder::new();

        if let Some(severity_strings) = &self.filter_severity {
            let severities = parse_severities(severity_strings)?;
            builder = builder.severities(&severities);
        }
        if let Some(checks) = &self.filter_check {
            builder = builder.checks(checks);
        }
        if let Some(patterns) = &self.filter_file {
            builder = builder.file_patterns(patterns);
        }
        if let Some(group_by) = self.group_by {
            builder = builder.group_by(group_by);
        }
        if let Some(limit) = self.limit {
            builder = builder.limit(limit);
        }

        // Unfiltered runs keep the per-check protocol in run order
        let mut options = builder.build();
        if options.is_active() {
            options.sort_by = SortBy::Location;
        }
        Ok(options)
    }

    /// Check if a machine-readable format is active
    pub fn is_json_mode(&self) -> bool {
        self.output_format.is_machine()
    }
}
