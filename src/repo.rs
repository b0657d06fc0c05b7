//! Repository publication.
//!
//! Built archives are copied into the repository directory and the index is
//! rebuilt from scratch over every archive found there. The index is never
//! updated incrementally, so archives removed from the directory disappear
//! from the index on the next run.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::build::artifacts;
use crate::config::Config;
use crate::error::PublishError;
use crate::process::{CommandRunner, Invocation};
use crate::ui;

pub const REPO_ADD: &str = "repo-add";

const INDEX_EXTS: &[&str] = &["gz", "xz", "zst", "bz2"];

/// What a publication changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    /// Archives copied into the repository directory.
    pub copied: Vec<PathBuf>,
    /// Archives the rebuilt index covers.
    pub indexed: Vec<PathBuf>,
}

/// Copy `built` into the repository and rebuild the index.
pub fn publish(
    runner: &dyn CommandRunner,
    config: &Config,
    built: &[PathBuf],
) -> Result<Publication> {
    let copied = copy_packages(built, &config.repo_dir)?;

    let removed = remove_index_files(config)?;
    tracing::debug!(count = removed.len(), "removed previous index files");

    let indexed = artifacts::find_archives(&config.repo_dir)?;
    if indexed.is_empty() {
        return Err(PublishError::NothingToIndex {
            dir: config.repo_dir.clone(),
        }
        .into());
    }

    ui::detail(
        config.quiet,
        &format!(
            "Indexing {} package(s) into {}",
            indexed.len(),
            config.db_path().display()
        ),
    );
    repo_add_invocation(config, &indexed)
        .run(runner)
        .with_context(|| PublishError::Index {
            db: config.db_path(),
        })?;

    Ok(Publication { copied, indexed })
}

/// Copy archives into `repo_dir`, overwriting same-named files.
pub fn copy_packages(archives: &[PathBuf], repo_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(repo_dir)
        .with_context(|| format!("Failed to create {}", repo_dir.display()))?;

    let mut copied = Vec::with_capacity(archives.len());
    for archive in archives {
        let name = archive
            .file_name()
            .with_context(|| format!("Not a file: {}", archive.display()))?;
        let dest = repo_dir.join(name);

        if !is_same_file(archive, &dest) {
            fs::copy(archive, &dest).with_context(|| {
                format!("Failed to copy {} to {}", archive.display(), dest.display())
            })?;
        }
        copied.push(dest);
    }
    Ok(copied)
}

/// Every path the index for `repo_name` may occupy in `repo_dir`.
pub fn index_files(repo_dir: &Path, repo_name: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for kind in ["db", "files"] {
        let mut bases = vec![format!("{}.{}", repo_name, kind)];
        bases.extend(
            INDEX_EXTS
                .iter()
                .map(|ext| format!("{}.{}.tar.{}", repo_name, kind, ext)),
        );
        for base in bases {
            paths.push(repo_dir.join(&base));
            paths.push(repo_dir.join(format!("{}.old", base)));
            paths.push(repo_dir.join(format!("{}.sig", base)));
            paths.push(repo_dir.join(format!("{}.old.sig", base)));
        }
    }
    paths
}

/// Delete the previous index (including repo-add's symlinks). Returns what
/// was removed.
pub fn remove_index_files(config: &Config) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for path in index_files(&config.repo_dir, &config.repo_name) {
        // symlink_metadata so dangling db symlinks are removed too
        if fs::symlink_metadata(&path).is_ok() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            removed.push(path);
        }
    }
    Ok(removed)
}

/// `repo-add [--sign] [--quiet] <db> <archives...>`
pub fn repo_add_invocation(config: &Config, archives: &[PathBuf]) -> Invocation {
    let mut inv = Invocation::new(REPO_ADD).dir(&config.repo_dir);
    if config.sign {
        inv = inv.arg("--sign");
    }
    if config.quiet {
        inv = inv.arg("--quiet");
    }
    inv = inv.arg_path(&config.db_path());
    for archive in archives {
        inv = inv.arg_path(archive);
    }
    inv
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
