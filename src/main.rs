//! pacrepo - build Arch packages and publish them to a pacman repository.
//!
//! Runs makepkg on the PKGBUILD in the current directory, copies the
//! resulting archives into a repository directory, rebuilds the index with
//! repo-add and optionally commits and pushes the directory with git.

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use pacrepo::cli::Cli;
use pacrepo::config::{env_snapshot, Config};
use pacrepo::process::SystemRunner;
use pacrepo::{pipeline, preflight, ui};

fn main() -> ExitCode {
    // Flag errors exit here, before anything else runs
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Cannot determine working directory")?;
    let config = Config::resolve(cli, &env_snapshot(), &cwd)?;
    tracing::debug!(?config, "configuration resolved");

    if cli.print_config {
        config.print();
        return Ok(());
    }

    let runner = SystemRunner;

    if cli.check {
        let report = preflight::run_preflight(&runner, &config);
        report.print();
        return match report.error() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        };
    }

    let report = pipeline::run(&runner, &config)?;
    report.print(&config);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "pacrepo=debug" } else { "pacrepo=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
