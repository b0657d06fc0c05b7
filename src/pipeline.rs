//! The build-and-publish pipeline.
//!
//! preflight → credentials → clean → checksums → makepkg → install →
//! copy + index → push. Each step runs only if the previous one succeeded.

use anyhow::Result;
use std::path::PathBuf;

use crate::build;
use crate::clean;
use crate::config::Config;
use crate::git::{self, PushOutcome};
use crate::preflight;
use crate::process::CommandRunner;
use crate::repo::{self, Publication};
use crate::timing::Timer;
use crate::ui;

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub built: Vec<PathBuf>,
    pub publication: Publication,
    pub push: Option<PushOutcome>,
}

impl RunReport {
    pub fn print(&self, config: &Config) {
        if config.quiet {
            return;
        }
        println!();
        println!(
            "Published {} package(s) to {} ({} in index)",
            self.built.len(),
            config.repo_dir.display(),
            self.publication.indexed.len()
        );
        if let Some(push) = &self.push {
            if push.committed {
                println!("Pushed {} to {}", push.branch, push.remote);
            } else {
                println!("Nothing new to commit; pushed {} to {}", push.branch, push.remote);
            }
        }
    }
}

/// Run every step `config` asks for.
pub fn run(runner: &dyn CommandRunner, config: &Config) -> Result<RunReport> {
    preflight::run_preflight_or_fail(runner, config)?;

    let credential = if config.push {
        Some(git::resolve_credential(config)?)
    } else {
        None
    };

    if config.clean {
        ui::step(config.quiet, "Cleaning build directory...");
        clean::clean_build_dir(config)?;
    }

    ui::step(config.quiet, "Building packages...");
    let timer = Timer::start("Build");
    build::refresh_checksums(runner, config)?;
    let built = build::build_packages(runner, config)?;
    timer.finish(config.quiet);

    if config.install {
        ui::step(config.quiet, "Installing packages...");
        build::install_packages(runner, config, &built)?;
    }

    ui::step(
        config.quiet,
        &format!("Publishing to {}...", config.repo_dir.display()),
    );
    let publication = repo::publish(runner, config, &built)?;

    let push = match credential {
        Some(credential) => {
            ui::step(config.quiet, "Pushing repository...");
            let timer = Timer::start("Push");
            let outcome = git::push_repository(runner, config, &credential)?;
            timer.finish(config.quiet);
            Some(outcome)
        }
        None => None,
    };

    Ok(RunReport {
        built,
        publication,
        push,
    })
}
