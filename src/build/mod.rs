//! Package build: checksum refresh, makepkg, archive collection, install.

pub mod artifacts;
pub mod checksums;
pub mod install;
pub mod makepkg;

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::BuildError;
use crate::process::CommandRunner;
use crate::ui;

pub use checksums::refresh_checksums;
pub use install::install_packages;

/// Run makepkg and return the archives it produced.
///
/// Archives that already sat in the build directory and were not rewritten
/// by this build are not reported.
pub fn build_packages(runner: &dyn CommandRunner, config: &Config) -> Result<Vec<PathBuf>> {
    let before = artifacts::Snapshot::take(&config.build_dir)?;

    makepkg::run_makepkg(runner, config)?;

    let built = before.changed(&config.build_dir)?;
    if built.is_empty() {
        return Err(BuildError::NoPackages {
            dir: config.build_dir.clone(),
        }
        .into());
    }

    for archive in &built {
        if let Some(name) = archive.file_name() {
            ui::detail(config.quiet, &format!("Built {}", name.to_string_lossy()));
        }
    }
    Ok(built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{CommandResult, MockCommandRunner};
    use std::fs;
    use tempfile::TempDir;

    fn config(tmp: &TempDir) -> Config {
        let mut config = Config::new(tmp.path());
        config.quiet = true;
        config
    }

    #[test]
    fn returns_archives_written_by_the_builder() {
        let tmp = TempDir::new().unwrap();
        let config = config(&tmp);
        fs::write(tmp.path().join("stale-0.1-1-any.pkg.tar.zst"), "old").unwrap();

        let out = tmp.path().join("pkg-1.0-1-x86_64.pkg.tar.zst");
        let written = out.clone();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|inv| inv.program() == "makepkg")
            .times(1)
            .returning(move |_| {
                fs::write(&written, "pkg").unwrap();
                Ok(CommandResult::ok())
            });

        let built = build_packages(&runner, &config).unwrap();
        assert_eq!(built, vec![out]);
    }

    #[test]
    fn no_archives_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let config = config(&tmp);

        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_| Ok(CommandResult::ok()));

        let err = build_packages(&runner, &config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::NoPackages { .. })
        ));
        assert!(err.to_string().contains("no built packages found"));
    }

    #[test]
    fn builder_failure_propagates() {
        let tmp = TempDir::new().unwrap();
        let config = config(&tmp);

        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_| Ok(CommandResult::with_output(4, "", "==> ERROR: A failure occurred")));

        let err = build_packages(&runner, &config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::Makepkg { .. })
        ));
        let msg = format!("{:#}", err);
        assert!(msg.starts_with("package build failed in "));
        assert!(msg.contains("'makepkg' failed (exit code 4)"));
        assert!(msg.contains("A failure occurred"));
    }
}
