//! Builder invocation.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::error::BuildError;
use crate::process::{CommandRunner, Invocation};

pub const MAKEPKG: &str = "makepkg";

/// `makepkg <flags>` in the build directory.
///
/// Output streams to the terminal unless `--quiet`, in which case it is
/// captured and only shown if the build fails.
pub fn makepkg_invocation(config: &Config) -> Invocation {
    let inv = Invocation::new(MAKEPKG)
        .args(&config.makepkg_flags)
        .dir(&config.build_dir);
    if config.quiet {
        inv
    } else {
        inv.interactive()
    }
}

pub fn run_makepkg(runner: &dyn CommandRunner, config: &Config) -> Result<()> {
    makepkg_invocation(config)
        .run(runner)
        .with_context(|| BuildError::Makepkg {
            dir: config.build_dir.clone(),
        })?;
    Ok(())
}
