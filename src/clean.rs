//! Build directory cleaning.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::build::artifacts;
use crate::config::Config;
use crate::ui;

/// Remove makepkg's `src/` and `pkg/` directories and old package archives
/// (with their signatures) from the build directory.
///
/// Archives are kept when the repository directory is the build directory,
/// since those are the published packages.
pub fn clean_build_dir(config: &Config) -> Result<()> {
    let build_dir = &config.build_dir;
    let mut cleaned = false;

    for name in ["src", "pkg"] {
        let dir = build_dir.join(name);
        if dir.is_dir() {
            ui::detail(config.quiet, &format!("Removing {}/...", name));
            fs::remove_dir_all(&dir)
                .with_context(|| format!("Failed to remove {}", dir.display()))?;
            cleaned = true;
        }
    }

    if same_dir(build_dir, &config.repo_dir) {
        ui::warn("Repository directory is the build directory; keeping existing archives");
    } else {
        for archive in artifacts::find_archives(build_dir)? {
            ui::detail(
                config.quiet,
                &format!("Removing {}...", archive.display()),
            );
            fs::remove_file(&archive)
                .with_context(|| format!("Failed to remove {}", archive.display()))?;

            let mut sig = archive.into_os_string();
            sig.push(".sig");
            let sig = PathBuf::from(sig);
            match fs::remove_file(&sig) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => {
                    return Err(e).with_context(|| format!("Failed to remove {}", sig.display()));
                }
                _ => {}
            }
            cleaned = true;
        }
    }

    if cleaned {
        ui::detail(config.quiet, "Build directory cleaned.");
    } else {
        ui::detail(config.quiet, "Nothing to clean.");
    }

    Ok(())
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
