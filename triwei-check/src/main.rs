//! triwei-check - content checks for the TriWei games site
//!
//! This is the CLI entry point for the check system, providing a single
//! interface to the triwei-check-core library. It replaces the separate
//! link, asset-budget, spec, sanity and dist-size scripts with one tool that
//! CI and authors run the same way.

use std::process::ExitCode;

use anyhow::{
    Context,
    Result,
};
use chrono::NaiveDate;
use clap::{
    Parser,
    Subcommand,
};
use serde_json::json;
use triwei_check_core::{
    SiteCheck,
    all_checks,
    checks::DistSizeCheck,
    find_check,
    posts::{
        PostRequest,
        generate_post,
    },
    run_checks,
    sync::sync_data,
};

mod helpers;

use helpers::{
    GlobalArgs,
    load_site,
};

/// Exit status when every check passed
const EXIT_OK: u8 = 0;
/// Exit status when a check reported content errors
const EXIT_CONTENT_ERRORS: u8 = 1;
/// Exit status when the tool itself failed
const EXIT_TOOL_FAILURE: u8 = 2;

/// TriWei site checks - manifest, specs, links, asset budgets and build size
#[derive(Parser)]
#[command(name = "triwei-check")]
#[command(
    version,
    about = "Content checks for the TriWei games site",
    long_about = "
Content checks for the TriWei games site

Usage:
  triwei-check <COMMAND>

Examples:
  triwei-check all
  triwei-check all --fail-fast
  triwei-check links --output json
  triwei-check dist --budget-mb 250
  triwei-check all --filter-severity error --group-by file
  triwei-check sync-data
  triwei-check new-post --topic \"AI in everyday life\"

Output Formats:
  --output human        Line protocol, colored on a terminal (default)
  --output json         One JSON document for tooling
  --output json-lines   One diagnostic per line

Exit Status:
  0  all checks passed
  1  a check reported errors
  2  the tool failed (bad arguments, unreadable site, invalid config)
"
)]
#[command(author = "The TriWei Site Developers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Site root directory (default: nearest ancestor with a games/ directory)
    #[arg(long, global = true, env = "TRIWEI_SITE_ROOT")]
    root: Option<String>,

    /// Configuration file (default: .triwei-check.toml in the site root)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Output format for check results
    #[arg(long, global = true, value_enum, default_value = "human")]
    output: OutputFormatArg,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Filter diagnostics by severity (comma-separated: error,warning,info)
    #[arg(long, global = true, value_delimiter = ',')]
    filter_severity: Option<Vec<String>>,

    /// Filter diagnostics by check (comma-separated: games,specs,links,assets,dist)
    #[arg(long, global = true, value_delimiter = ',')]
    filter_check: Option<Vec<String>>,

    /// Filter diagnostics by file patterns (comma-separated glob patterns)
    #[arg(long, global = true, value_delimiter = ',')]
    filter_file: Option<Vec<String>>,

    /// Group diagnostics by criterion
    #[arg(long, global = true, value_enum)]
    group_by: Option<GroupByArg>,

    /// Limit number of diagnostics shown
    #[arg(long, global = true)]
    limit: Option<usize>,
}

/// Available output formats
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputFormatArg {
    /// Line protocol with colors on a terminal (default)
    Human,
    /// JSON document for tooling
    Json,
    /// JSON Lines format for streaming output
    JsonLines,
}

/// Available grouping options
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum GroupByArg {
    /// Group by check name
    Check,
    /// Group by file path
    File,
    /// Group by severity level
    Severity,
}

/// Available subcommands
#[derive(Subcommand)]
enum Commands {
    /// Check that template and HTML links resolve
    Links,

    /// Check asset-pack and per-game transfer budgets
    Assets,

    /// Check spec pages against the games manifest
    Specs,

    /// Check manifest entries, game folders, permalinks and inline scripts
    Games,

    /// Check the build output directory size
    Dist {
        /// Size budget in MB (default: from config, 300)
        #[arg(long)]
        budget_mb: Option<u64>,
    },

    /// Run every check in order
    All {
        /// Stop after the first failing check
        #[arg(long)]
        fail_fast: bool,
    },

    /// List available checks
    List,

    /// Copy the games manifest and card overrides into _data/
    SyncData,

    /// Scaffold a new blog post in _posts/
    NewPost {
        /// Post topic (default: rotates through the configured topics)
        #[arg(long)]
        topic: Option<String>,

        /// Post date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Overwrite an existing post
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let args = GlobalArgs::from_cli(&cli);

    match run(&cli, &args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            args.output.error(&format!("{:#}", e));
            ExitCode::from(EXIT_TOOL_FAILURE)
        },
    }
}

fn run(cli: &Cli, args: &GlobalArgs) -> Result<u8> {
    if args.verbose {
        args.output.header(&format!("triwei-check v{}", triwei_check_core::VERSION));
    }

    match &cli.command {
        Commands::Links => cmd_check(args, "links"),
        Commands::Assets => cmd_check(args, "assets"),
        Commands::Specs => cmd_check(args, "specs"),
        Commands::Games => cmd_check(args, "games"),
        Commands::Dist { budget_mb } => {
            let check: Box<dyn SiteCheck> = match budget_mb {
                Some(mb) => Box::new(DistSizeCheck::with_budget(*mb)),
                None => Box::new(DistSizeCheck::default()),
            };
            cmd_run(args, "dist", &[check], false)
        },
        Commands::All { fail_fast } => cmd_run(args, "all", &all_checks(), *fail_fast),
        Commands::List => cmd_list(args),
        Commands::SyncData => cmd_sync_data(args),
        Commands::NewPost { topic, date, force } => {
            let request = PostRequest {
                topic: topic.clone(),
                date:  *date,
                force: *force,
            };
            cmd_new_post(args, &request)
        },
    }
}

/// Run one named check
fn cmd_check(args: &GlobalArgs, name: &str) -> Result<u8> {
    let check = find_check(name).with_context(|| format!("Unknown check: {}", name))?;
    cmd_run(args, name, &[check], false)
}

/// Run checks, print the results and map them to an exit status
fn cmd_run(args: &GlobalArgs, command: &str, checks: &[Box<dyn SiteCheck>], fail_fast: bool) -> Result<u8> {
    let loaded = load_site(args)?;
    let filter_options = args.build_filter_options()?;

    let collection = run_checks(&loaded.site, checks, command, fail_fast)
        .with_context(|| format!("Failed to run {} checks", command))?;

    args.output.emit_collection(&collection, &filter_options)?;
    if collection.checks.len() < checks.len() {
        args.output.warning(&format!(
            "Stopped after {} of {} checks (--fail-fast)",
            collection.checks.len(),
            checks.len()
        ));
    }
    args.output.verbose(&format!("Completed in {} ms", collection.summary.duration_ms));

    Ok(if collection.is_success() { EXIT_OK } else { EXIT_CONTENT_ERRORS })
}

/// List available checks
fn cmd_list(args: &GlobalArgs) -> Result<u8> {
    let checks = all_checks();
    if args.is_json_mode() {
        let listing: Vec<_> = checks
            .iter()
            .map(|check| json!({"name": check.name(), "description": check.description()}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(EXIT_OK);
    }

    args.output.header("Available checks:");
    for check in &checks {
        args.output.info(&format!("  {:<8} {}", check.name(), check.description()));
    }
    Ok(EXIT_OK)
}

/// Mirror the games data files into _data/
fn cmd_sync_data(args: &GlobalArgs) -> Result<u8> {
    let loaded = load_site(args)?;
    let synced = sync_data(&loaded.site, |file| {
        args.output.success(&format!("Synced {} -> {}", file.src, file.dest));
    })
    .context("Failed to sync games data")?;

    if args.is_json_mode() {
        let listing: Vec<_> = synced.iter().map(|s| json!({"src": s.src, "dest": s.dest})).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "synced": listing,
                "config": loaded.config_source.map(|p| p.display().to_string()),
            }))?
        );
    }
    Ok(EXIT_OK)
}

/// Scaffold a blog post
fn cmd_new_post(args: &GlobalArgs, request: &PostRequest) -> Result<u8> {
    let loaded = load_site(args)?;
    let post = generate_post(&loaded.site, request).context("Failed to generate post")?;

    if args.is_json_mode() {
        println!("{}", serde_json::to_string_pretty(&json!({"path": post.path, "title": post.title}))?);
        return Ok(EXIT_OK);
    }

    args.output.success(&format!("Generated post: {}", post.path));
    args.output.verbose(&format!("Title: {}", post.title));
    Ok(EXIT_OK)
}
