//! Site checks
//!
//! Each check is an independent single pass over the site: it loads its own
//! inputs, records every problem it finds and never depends on another
//! check having run.

use std::time::Instant;

use crate::{
    diagnostics::{
        CheckReport,
        DiagnosticCollection,
    },
    error::CheckResult,
    site::{
        Site,
        decode_text,
    },
};

pub mod assets;
pub mod dist;
pub mod games;
pub mod links;
pub mod specs;

pub use assets::AssetBudgetCheck;
pub use dist::DistSizeCheck;
pub use games::GameSanityCheck;
pub use links::BrokenLinkCheck;
pub use specs::GameSpecCheck;

/// A validator over one site checkout
pub trait SiteCheck {
    /// Short name used on the command line and in diagnostics
    fn name(&self) -> &'static str;

    /// One-line description for `list`
    fn description(&self) -> &'static str;

    /// Run the check
    fn run(&self, site: &Site) -> CheckResult<CheckReport>;
}

/// Every check, in the order `all` runs them
pub fn all_checks() -> Vec<Box<dyn SiteCheck>> {
    vec![
        Box::new(GameSanityCheck),
        Box::new(GameSpecCheck),
        Box::new(BrokenLinkCheck),
        Box::new(AssetBudgetCheck),
        Box::new(DistSizeCheck::default()),
    ]
}

/// Look up a check by name
pub fn find_check(name: &str) -> Option<Box<dyn SiteCheck>> {
    all_checks().into_iter().find(|check| check.name() == name)
}

/// Run checks in order and merge their reports.
///
/// With `fail_fast`, checks after the first failing one are skipped.
pub fn run_checks(
    site: &Site,
    checks: &[Box<dyn SiteCheck>],
    command: &str,
    fail_fast: bool,
) -> CheckResult<DiagnosticCollection> {
    let started = Instant::now();
    let mut collection = DiagnosticCollection::new(site.root(), command);

    for check in checks {
        let check_started = Instant::now();
        let mut report = check.run(site)?;
        report.duration_ms = check_started.elapsed().as_millis() as u64;

        let failed = !report.is_success();
        collection.add_report(report);
        if failed && fail_fast {
            break;
        }
    }

    Ok(collection.finalize(started.elapsed().as_millis() as u64))
}

/// Read a site-relative text file, recording an error diagnostic instead
/// of failing when it can't be read
pub(crate) fn read_or_report(site: &Site, report: &mut CheckReport, rel: &str) -> Option<String> {
    match std::fs::read(site.abs(rel)) {
        Ok(bytes) => Some(decode_text(bytes)),
        Err(e) => {
            report.error(format!("Unable to read file: {} ({})", rel, e)).file = Some(rel.to_string());
            None
        },
    }
}
