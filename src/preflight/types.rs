//! Check outcomes and the report the pipeline gates on.

use crate::error::PreflightError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    /// The run can't succeed.
    Fail,
    /// Usable, but a step will be degraded.
    Warn,
    /// Not needed for the requested steps.
    Skip,
}

impl CheckStatus {
    fn icon(self) -> &'static str {
        match self {
            Self::Pass => "✓",
            Self::Fail => "✗",
            Self::Warn => "⚠",
            Self::Skip => "○",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Warn => "WARN",
            Self::Skip => "SKIP",
        }
    }
}

/// One tool or path that was looked at.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: Option<String>,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, details: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            status,
            details: details.map(str::to_string),
        }
    }

    pub fn pass(name: &str) -> Self {
        Self::new(name, CheckStatus::Pass, None)
    }

    pub fn pass_with(name: &str, details: &str) -> Self {
        Self::new(name, CheckStatus::Pass, Some(details))
    }

    pub fn fail(name: &str, details: &str) -> Self {
        Self::new(name, CheckStatus::Fail, Some(details))
    }

    pub fn warn(name: &str, details: &str) -> Self {
        Self::new(name, CheckStatus::Warn, Some(details))
    }

    pub fn skip(name: &str, reason: &str) -> Self {
        Self::new(name, CheckStatus::Skip, Some(reason))
    }

    /// `  ✓ [PASS] makepkg: /usr/bin/makepkg`
    pub fn line(&self) -> String {
        let head = format!("  {} [{}] {}", self.status.icon(), self.status.label(), self.name);
        match &self.details {
            Some(details) => format!("{}: {}", head, details),
            None => head,
        }
    }

    /// Failures go to stderr, everything else to stdout.
    fn print(&self) {
        match self.status {
            CheckStatus::Fail => eprintln!("{}", self.line()),
            _ => println!("{}", self.line()),
        }
    }
}

/// Every check from one preflight run, in the order they ran.
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    fn with_status(&self, status: CheckStatus) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(move |c| c.status == status)
    }

    pub fn all_passed(&self) -> bool {
        self.fail_count() == 0
    }

    pub fn fail_count(&self) -> usize {
        self.with_status(CheckStatus::Fail).count()
    }

    pub fn warn_count(&self) -> usize {
        self.with_status(CheckStatus::Warn).count()
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.with_status(CheckStatus::Fail)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CheckResult> {
        self.with_status(CheckStatus::Warn)
    }

    /// The error a failed report turns into, if any check failed.
    pub fn error(&self) -> Option<PreflightError> {
        (!self.all_passed()).then(|| PreflightError::ChecksFailed {
            count: self.fail_count(),
            names: self.failed_names().join(", "),
        })
    }

    pub fn print_failures(&self) {
        self.with_status(CheckStatus::Fail).for_each(CheckResult::print);
    }

    /// Full report as shown by `--check`.
    pub fn print(&self) {
        println!("=== Preflight Check Results ===\n");
        self.checks.iter().for_each(CheckResult::print);
        println!();

        let passed = self.with_status(CheckStatus::Pass).count();
        let skipped = self.with_status(CheckStatus::Skip).count();
        println!(
            "Summary: {}/{} passed, {} skipped",
            passed,
            self.checks.len() - skipped,
            skipped
        );
        match self.fail_count() {
            0 => {}
            n => println!("         {} FAILED - nothing will be built", n),
        }
        match self.warn_count() {
            0 => {}
            n => println!("         {} warning(s)", n),
        }
    }
}
