//! Command-line flags.
//!
//! Every flag may be repeated; the last occurrence wins.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "pacrepo", version)]
#[command(about = "Build Arch packages with makepkg and publish them to a pacman repository")]
#[command(args_override_self = true)]
#[command(
    after_help = "ENVIRONMENT:\n  PACREPO_REPO_DIR, PACREPO_REPO_NAME, PACREPO_REMOTE, PACREPO_BRANCH\n  PACREPO_MAKEPKG_FLAGS, PACREPO_DB_EXT, PACREPO_AUTH, PACREPO_GIT_USER, PACREPO_TOKEN\n\nA .env file in the working directory is loaded first; real environment variables win."
)]
pub struct Cli {
    /// Don't run updpkgsums before building
    #[arg(long = "no-updpkgsums")]
    pub no_updpkgsums: bool,

    /// Install the built packages with pacman after building
    #[arg(long)]
    pub install: bool,

    /// Repository directory to publish into (default: ./repo)
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Repository name, used for the index file names (default: custom)
    #[arg(long = "repo-name", value_name = "NAME")]
    pub repo_name: Option<String>,

    /// Commit and push the repository directory after publishing
    #[arg(long)]
    pub push: bool,

    /// Git remote URL for the repository directory
    #[arg(long, value_name = "URL")]
    pub remote: Option<String>,

    /// Branch to push (default: main)
    #[arg(long, value_name = "NAME")]
    pub branch: Option<String>,

    /// Remove src/, pkg/ and old package archives before building
    #[arg(long)]
    pub clean: bool,

    /// Ask repo-add to sign the repository index
    #[arg(long)]
    pub sign: bool,

    /// Only print warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Print every external command that is run
    #[arg(short, long)]
    pub verbose: bool,

    /// Push with an access token injected into the https remote
    #[arg(long = "token-auth", overrides_with = "ssh")]
    pub token_auth: bool,

    /// Push with ambient SSH keys
    #[arg(long, overrides_with = "token_auth")]
    pub ssh: bool,

    /// Directory containing the PKGBUILD (default: current directory)
    #[arg(short = 'C', long = "directory", value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Run preflight checks, print the report and exit
    #[arg(long, conflicts_with = "print_config")]
    pub check: bool,

    /// Print the resolved configuration and exit
    #[arg(long = "print-config")]
    pub print_config: bool,
}
