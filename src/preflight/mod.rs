//! Preflight checks.
//!
//! Validates host tools and the build environment before anything is
//! built. Checks only look things up; they never write to disk or run
//! external programs.

mod environment;
mod host_tools;
mod types;
mod validators;

use anyhow::Result;

use crate::config::Config;
use crate::process::CommandRunner;
use crate::ui;

pub use types::{CheckResult, CheckStatus, PreflightReport};
pub use validators::validate_recipe;

/// Run all preflight checks.
pub fn run_preflight(runner: &dyn CommandRunner, config: &Config) -> PreflightReport {
    let mut checks = Vec::new();

    ui::step(config.quiet, "Running preflight checks...");

    // =======================================================================
    // Host Tools
    // =======================================================================
    checks.extend(host_tools::check_host_tools(runner, config));

    // =======================================================================
    // Build Environment
    // =======================================================================
    checks.extend(environment::check_build_environment(config));

    PreflightReport { checks }
}

/// Run preflight and bail if any checks fail.
///
/// Failed checks are printed to stderr; the full report is printed with
/// `--verbose`.
pub fn run_preflight_or_fail(runner: &dyn CommandRunner, config: &Config) -> Result<()> {
    let report = run_preflight(runner, config);

    for warning in report.warnings() {
        ui::warn(&format!(
            "{}: {}",
            warning.name,
            warning.details.as_deref().unwrap_or("")
        ));
    }

    if let Some(err) = report.error() {
        report.print_failures();
        return Err(err.into());
    }

    if config.verbose && !config.quiet {
        report.print();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::MockCommandRunner;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn runner_with(available: &'static [&'static str]) -> MockCommandRunner {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();
        runner.expect_locate().returning(move |p| {
            available
                .contains(&p)
                .then(|| PathBuf::from("/usr/bin").join(p))
        });
        runner
    }

    fn config_with_recipe() -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("PKGBUILD"), "pkgname=hello\npkgver=1\n").unwrap();
        let mut config = Config::new(tmp.path());
        config.quiet = true;
        (tmp, config)
    }

    #[test]
    fn passes_with_all_tools() {
        let (_tmp, config) = config_with_recipe();
        let runner = runner_with(&["makepkg", "repo-add", "bsdtar", "updpkgsums"]);
        run_preflight_or_fail(&runner, &config).unwrap();
    }

    #[test]
    fn missing_builder_fails_without_side_effects() {
        let (tmp, config) = config_with_recipe();
        let runner = runner_with(&["repo-add", "bsdtar"]);

        let err = run_preflight_or_fail(&runner, &config).unwrap_err();
        assert!(err.to_string().contains("makepkg"));
        assert!(!config.repo_dir.exists());
        let entries: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn push_requires_git() {
        let (_tmp, mut config) = config_with_recipe();
        config.push = true;
        let runner = runner_with(&["makepkg", "repo-add", "bsdtar"]);

        let err = run_preflight_or_fail(&runner, &config).unwrap_err();
        assert!(err.to_string().contains("git"));
    }

    #[test]
    fn install_requires_sudo_and_pacman() {
        let (_tmp, mut config) = config_with_recipe();
        config.install = true;
        let runner = runner_with(&["makepkg", "repo-add", "bsdtar", "pacman"]);

        let err = run_preflight_or_fail(&runner, &config).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("sudo"));
        assert!(!msg.contains("pacman"));
    }

    #[test]
    fn missing_recipe_fails() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::new(tmp.path());
        config.quiet = true;
        let runner = runner_with(&["makepkg", "repo-add", "bsdtar"]);

        let err = run_preflight_or_fail(&runner, &config).unwrap_err();
        assert!(err.to_string().contains("PKGBUILD"));
    }

    #[test]
    fn missing_updpkgsums_only_warns() {
        let (_tmp, config) = config_with_recipe();
        let runner = runner_with(&["makepkg", "repo-add", "bsdtar"]);

        let report = run_preflight(&runner, &config);
        assert!(report.all_passed());
        assert_eq!(report.warn_count(), 1);
    }
}
