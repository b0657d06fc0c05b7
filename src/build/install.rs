//! Optional local install of the freshly built packages.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::BuildError;
use crate::process::{CommandRunner, Invocation};

pub fn install_invocation(archives: &[PathBuf]) -> Invocation {
    let mut inv = Invocation::new("sudo")
        .args(["pacman", "-U", "--noconfirm"])
        .error_msg("pacman -U failed");
    for archive in archives {
        inv = inv.arg_path(archive);
    }
    inv.interactive()
}

/// `sudo pacman -U --noconfirm <archives>`.
pub fn install_packages(
    runner: &dyn CommandRunner,
    config: &Config,
    archives: &[PathBuf],
) -> Result<()> {
    if archives.is_empty() {
        return Ok(());
    }
    install_invocation(archives)
        .dir(&config.build_dir)
        .run(runner)
        .context(BuildError::Install)?;
    Ok(())
}
