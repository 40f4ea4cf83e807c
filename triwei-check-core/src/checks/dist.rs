//! Build output size budget

use super::SiteCheck;
use crate::{
    diagnostics::CheckReport,
    error::CheckResult,
    site::Site,
};

const MIB: u64 = 1024 * 1024;

/// Checks the total size of the build output directory
#[derive(Debug, Clone, Copy, Default)]
pub struct DistSizeCheck {
    budget_mb: Option<u64>,
}

impl DistSizeCheck {
    /// Use `budget_mb` instead of the configured budget
    pub fn with_budget(budget_mb: u64) -> Self {
        Self {
            budget_mb: Some(budget_mb),
        }
    }
}

impl SiteCheck for DistSizeCheck {
    fn name(&self) -> &'static str {
        "dist"
    }

    fn description(&self) -> &'static str {
        "Build output directory stays within its size budget"
    }

    fn run(&self, site: &Site) -> CheckResult<CheckReport> {
        let config = &site.config().dist;
        let budget = self.budget_mb.unwrap_or(config.budget_mb);
        let mut report = CheckReport::new(self.name());

        if !site.is_dir(&config.dir) {
            report.error(format!("Missing build output directory: {}", config.dir));
            return Ok(report);
        }

        let files = site.list_files(&config.dir, &[])?;
        let mut total_bytes = 0;
        for file in &files {
            total_bytes += site.file_size(file)?;
        }
        let size_mb = total_bytes.div_ceil(MIB);

        report.stat("Build output files", files.len());
        if size_mb > budget {
            report.error(format!("Build too large: {} MB > {} MB", size_mb, budget)).file = Some(config.dir.clone());
        } else {
            report.pass_message = Some(format!("dist size OK: {} MB <= {} MB", size_mb, budget));
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FixtureSite;

    #[test]
    fn test_missing_dist_is_an_error() {
        let fixture = FixtureSite::valid();
        let report = DistSizeCheck::default().run(&fixture.site()).unwrap();
        assert_eq!(report.diagnostics[0].message, "Missing build output directory: dist");
    }

    #[test]
    fn test_size_rounds_up_to_whole_megabytes() {
        let fixture = FixtureSite::valid();
        fixture.write("dist/index.html", vec![b'x'; 1024 * 1024 + 1]);
        fixture.write("dist/assets/app.js", "console.log(1)");

        let report = DistSizeCheck::default().run(&fixture.site()).unwrap();
        assert!(report.is_success());
        assert_eq!(report.pass_message.as_deref(), Some("dist size OK: 2 MB <= 300 MB"));
        assert_eq!(report.stat_value("Build output files"), Some(2));

        let report = DistSizeCheck::with_budget(1).run(&fixture.site()).unwrap();
        assert_eq!(report.diagnostics[0].message, "Build too large: 2 MB > 1 MB");
    }

    #[test]
    fn test_empty_dist_passes() {
        let fixture = FixtureSite::valid();
        fixture.mkdir("dist");
        let report = DistSizeCheck::with_budget(0).run(&fixture.site()).unwrap();
        assert_eq!(report.pass_message.as_deref(), Some("dist size OK: 0 MB <= 0 MB"));
    }
}
