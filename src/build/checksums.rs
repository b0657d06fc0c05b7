//! Checksum refresh with `updpkgsums`.
//!
//! Only recipes that download archives or other remote files need their
//! checksum arrays regenerated; VCS and local sources are left alone.

use anyhow::{Context, Result};
use std::fs;

use crate::config::Config;
use crate::error::BuildError;
use crate::process::{CommandRunner, Invocation};
use crate::ui;

pub const UPDPKGSUMS: &str = "updpkgsums";

const ARCHIVE_SUFFIXES: &[&str] = &[
    ".tar", ".tar.gz", ".tgz", ".tar.bz2", ".tbz2", ".tar.xz", ".txz", ".tar.zst", ".tzst",
    ".tar.lz", ".zip", ".7z", ".gz", ".bz2", ".xz", ".zst",
];

const REMOTE_SCHEMES: &[&str] = &["http://", "https://", "ftp://"];

/// Entries of every `source=(...)` / `source_<arch>=(...)` array.
pub fn source_entries(pkgbuild: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut rest = pkgbuild;

    while let Some(start) = find_source_array(rest) {
        let body = &rest[start..];
        let end = body.find(')').unwrap_or(body.len());
        for line in body[..end].lines() {
            let line = line.split('#').next().unwrap_or("");
            entries.extend(
                line.split_whitespace()
                    .map(|t| t.trim_matches(|c| c == '"' || c == '\''))
                    .filter(|t| !t.is_empty())
                    .map(String::from),
            );
        }
        rest = &body[end..];
    }

    entries
}

/// Byte offset just past the `(` of the next source array.
fn find_source_array(text: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with("source") {
            if let Some(eq) = trimmed.find("=(") {
                let name = &trimmed[..eq];
                let is_source = name == "source"
                    || name
                        .strip_prefix("source_")
                        .is_some_and(|arch| arch.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
                if is_source {
                    let indent = line.len() - trimmed.len();
                    return Some(offset + indent + eq + 2);
                }
            }
        }
        offset += line.len();
    }
    None
}

/// True if a source entry is an archive or a plain remote download.
pub fn is_archive_source(entry: &str) -> bool {
    // `name::url` renames the download
    let location = entry.split_once("::").map_or(entry, |(_, url)| url);
    let location = location.split(['#', '?']).next().unwrap_or(location);
    let lower = location.to_ascii_lowercase();

    REMOTE_SCHEMES.iter().any(|s| lower.starts_with(s))
        || ARCHIVE_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

pub fn references_archive_sources(pkgbuild: &str) -> bool {
    source_entries(pkgbuild).iter().any(|e| is_archive_source(e))
}

/// Run `updpkgsums` when the recipe needs it.
///
/// Returns true if checksums were refreshed.
pub fn refresh_checksums(runner: &dyn CommandRunner, config: &Config) -> Result<bool> {
    if !config.update_checksums {
        ui::detail(config.quiet, "Skipping updpkgsums (--no-updpkgsums)");
        return Ok(false);
    }

    let recipe = config.recipe_path();
    let text = fs::read_to_string(&recipe)
        .with_context(|| format!("Failed to read {}", recipe.display()))?;

    if !references_archive_sources(&text) {
        ui::detail(config.quiet, "No archive sources, checksums left as-is");
        return Ok(false);
    }

    if runner.locate(UPDPKGSUMS).is_none() {
        ui::warn("updpkgsums not found (install pacman-contrib); checksums not refreshed");
        return Ok(false);
    }

    ui::detail(config.quiet, "Refreshing checksums with updpkgsums");
    Invocation::new(UPDPKGSUMS)
        .dir(&config.build_dir)
        .run(runner)
        .context(BuildError::Checksums)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{CommandResult, MockCommandRunner};
    use std::path::PathBuf;
    use tempfile::TempDir;

    const TARBALL_RECIPE: &str = r#"
pkgname=hello
pkgver=2.12
source=("https://ftp.gnu.org/gnu/hello/hello-$pkgver.tar.gz"
        'hello.patch')
sha256sums=('SKIP' 'SKIP')
"#;

    const VCS_RECIPE: &str = r#"
pkgname=tool-git
source=("git+https://github.com/acme/tool.git")
sha256sums=('SKIP')
"#;

    #[test]
    fn parses_multiline_source_arrays() {
        let entries = source_entries(TARBALL_RECIPE);
        assert_eq!(
            entries,
            vec!["https://ftp.gnu.org/gnu/hello/hello-$pkgver.tar.gz", "hello.patch"]
        );
    }

    #[test]
    fn parses_arch_specific_arrays() {
        let recipe = "source_x86_64=('bin-x86_64.zip')\nsource_aarch64=('bin-aarch64.zip')\n";
        assert_eq!(source_entries(recipe), vec!["bin-x86_64.zip", "bin-aarch64.zip"]);
    }

    #[test]
    fn ignores_non_source_arrays() {
        let recipe = "sources_note=('x.tar.gz')\nmakedepends=('git')\n";
        assert!(source_entries(recipe).is_empty());
    }

    #[test]
    fn classifies_sources() {
        assert!(is_archive_source("https://example.com/foo-1.0.tar.gz"));
        assert!(is_archive_source("foo.tar.gz::https://example.com/download?id=1"));
        assert!(is_archive_source("local-1.0.zip"));
        assert!(!is_archive_source("git+https://github.com/acme/tool.git"));
        assert!(!is_archive_source("tool.service"));
        assert!(!is_archive_source("fix.patch"));
    }

    #[test]
    fn detects_archive_recipes() {
        assert!(references_archive_sources(TARBALL_RECIPE));
        assert!(!references_archive_sources(VCS_RECIPE));
        assert!(!references_archive_sources("pkgname=meta\n"));
    }

    fn config_with_recipe(recipe: &str) -> (TempDir, Config) {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("PKGBUILD"), recipe).unwrap();
        let mut config = Config::new(tmp.path());
        config.quiet = true;
        (tmp, config)
    }

    #[test]
    fn runs_updpkgsums_for_archive_sources() {
        let (_tmp, config) = config_with_recipe(TARBALL_RECIPE);
        let build_dir = config.build_dir.clone();

        let mut runner = MockCommandRunner::new();
        runner
            .expect_locate()
            .returning(|p| Some(PathBuf::from("/usr/bin").join(p)));
        runner
            .expect_run()
            .withf(move |inv| {
                inv.program() == UPDPKGSUMS && inv.current_dir() == Some(build_dir.as_path())
            })
            .times(1)
            .returning(|_| Ok(CommandResult::ok()));

        assert!(refresh_checksums(&runner, &config).unwrap());
    }

    #[test]
    fn skips_vcs_recipes() {
        let (_tmp, config) = config_with_recipe(VCS_RECIPE);
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();

        assert!(!refresh_checksums(&runner, &config).unwrap());
    }

    #[test]
    fn skips_when_disabled() {
        let (_tmp, mut config) = config_with_recipe(TARBALL_RECIPE);
        config.update_checksums = false;
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();
        runner.expect_locate().never();

        assert!(!refresh_checksums(&runner, &config).unwrap());
    }

    #[test]
    fn missing_updpkgsums_is_a_warning() {
        let (_tmp, config) = config_with_recipe(TARBALL_RECIPE);
        let mut runner = MockCommandRunner::new();
        runner.expect_locate().returning(|_| None);
        runner.expect_run().never();

        assert!(!refresh_checksums(&runner, &config).unwrap());
    }

    #[test]
    fn updpkgsums_failure_propagates() {
        let (_tmp, config) = config_with_recipe(TARBALL_RECIPE);
        let mut runner = MockCommandRunner::new();
        runner
            .expect_locate()
            .returning(|p| Some(PathBuf::from("/usr/bin").join(p)));
        runner
            .expect_run()
            .returning(|_| Ok(CommandResult::with_output(1, "", "download failed")));

        let err = refresh_checksums(&runner, &config).unwrap_err();
        assert_eq!(err.downcast_ref::<BuildError>(), Some(&BuildError::Checksums));
        assert!(format!("{:#}", err).contains("'updpkgsums' failed (exit code 1):\ndownload failed"));
    }
}
