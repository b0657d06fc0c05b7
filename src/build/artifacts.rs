//! Package archive discovery.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Compression suffixes makepkg can put after `.pkg.tar`.
const COMPRESSION_SUFFIXES: &[&str] = &[
    "", ".gz", ".bz2", ".xz", ".zst", ".lz4", ".lzo", ".lrz", ".lz", ".Z",
];

/// True for `name-ver-rel-arch.pkg.tar[.ext]`, false for signatures and
/// anything else.
pub fn is_package_archive(file_name: &str) -> bool {
    match file_name.rfind(".pkg.tar") {
        Some(idx) if idx > 0 => {
            let suffix = &file_name[idx + ".pkg.tar".len()..];
            COMPRESSION_SUFFIXES.contains(&suffix)
        }
        _ => false,
    }
}

/// All package archives directly inside `dir`, sorted by path.
///
/// A missing directory has no archives.
pub fn find_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut archives = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        if !entry.file_type().is_file() && !entry.path().is_file() {
            continue;
        }
        if is_package_archive(&entry.file_name().to_string_lossy()) {
            archives.push(entry.into_path());
        }
    }
    archives.sort();
    Ok(archives)
}

/// Archives present in a directory at one point in time, with their
/// modification times.
#[derive(Debug, Default)]
pub struct Snapshot {
    seen: HashMap<PathBuf, Option<SystemTime>>,
}

impl Snapshot {
    pub fn take(dir: &Path) -> Result<Self> {
        let seen = find_archives(dir)?
            .into_iter()
            .map(|p| {
                let mtime = p.metadata().and_then(|m| m.modified()).ok();
                (p, mtime)
            })
            .collect();
        Ok(Self { seen })
    }

    /// Archives in `dir` that are new or were rewritten since the snapshot.
    pub fn changed(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(find_archives(dir)?
            .into_iter()
            .filter(|p| match self.seen.get(p) {
                None => true,
                Some(before) => {
                    let now = p.metadata().and_then(|m| m.modified()).ok();
                    now != *before
                }
            })
            .collect())
    }
}
