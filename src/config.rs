//! Configuration management for pacrepo.
//!
//! Built-in defaults are overridden by environment variables (a `.env` file
//! in the working directory is loaded into the environment first, real
//! variables win), which are in turn overridden by command-line flags. The
//! result is an immutable [`Config`] handed to every pipeline step.

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::git::auth::{strip_userinfo, Secret};

pub const DEFAULT_REPO_NAME: &str = "custom";
pub const DEFAULT_REPO_DIR: &str = "repo";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_MAKEPKG_FLAGS: &[&str] = &["--syncdeps", "--force", "--noconfirm"];
pub const DEFAULT_TOKEN_USER: &str = "x-access-token";

/// Recipe file consumed by makepkg.
pub const RECIPE_FILE: &str = "PKGBUILD";

pub const REPO_DIR_ENV: &str = "PACREPO_REPO_DIR";
pub const REPO_NAME_ENV: &str = "PACREPO_REPO_NAME";
pub const REMOTE_ENV: &str = "PACREPO_REMOTE";
pub const BRANCH_ENV: &str = "PACREPO_BRANCH";
pub const MAKEPKG_FLAGS_ENV: &str = "PACREPO_MAKEPKG_FLAGS";
pub const DB_EXT_ENV: &str = "PACREPO_DB_EXT";
pub const AUTH_ENV: &str = "PACREPO_AUTH";
pub const TOKEN_USER_ENV: &str = "PACREPO_GIT_USER";
pub const TOKEN_ENV: &str = "PACREPO_TOKEN";

/// Compression of the repository index archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DbExt {
    #[default]
    Gz,
    Xz,
    Zst,
    Bz2,
}

impl DbExt {
    pub fn as_str(self) -> &'static str {
        match self {
            DbExt::Gz => "gz",
            DbExt::Xz => "xz",
            DbExt::Zst => "zst",
            DbExt::Bz2 => "bz2",
        }
    }

    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "gz" => Ok(DbExt::Gz),
            "xz" => Ok(DbExt::Xz),
            "zst" => Ok(DbExt::Zst),
            "bz2" => Ok(DbExt::Bz2),
            _ => Err(ConfigError::InvalidValue {
                var: DB_EXT_ENV,
                value: value.to_string(),
                expected: "gz, xz, zst, bz2",
            }),
        }
    }
}

/// How `--push` authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Ssh,
    Token,
}

impl AuthMode {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "ssh" => Ok(AuthMode::Ssh),
            "token" => Ok(AuthMode::Token),
            _ => Err(ConfigError::InvalidValue {
                var: AUTH_ENV,
                value: value.to_string(),
                expected: "ssh, token",
            }),
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository name; the index is `<repo_name>.db.tar.<ext>`
    pub repo_name: String,
    /// Directory holding the PKGBUILD
    pub build_dir: PathBuf,
    /// Repository directory packages are published into
    pub repo_dir: PathBuf,
    /// Git remote for the repository directory
    pub remote: Option<String>,
    pub branch: String,
    /// Flags passed to makepkg
    pub makepkg_flags: Vec<String>,
    pub db_ext: DbExt,
    pub auth: AuthMode,
    /// Username embedded next to the token
    pub token_user: String,
    /// Token captured from the environment at startup
    pub token_env: Option<Secret>,
    /// Token file consulted when the environment has no token
    pub token_file: PathBuf,
    pub update_checksums: bool,
    pub install: bool,
    pub push: bool,
    pub clean: bool,
    pub sign: bool,
    pub quiet: bool,
    pub verbose: bool,
}

impl Config {
    /// Defaults for a build in `cwd`.
    pub fn new(cwd: &Path) -> Self {
        Self {
            repo_name: DEFAULT_REPO_NAME.to_string(),
            build_dir: cwd.to_path_buf(),
            repo_dir: cwd.join(DEFAULT_REPO_DIR),
            remote: None,
            branch: DEFAULT_BRANCH.to_string(),
            makepkg_flags: DEFAULT_MAKEPKG_FLAGS.iter().map(|s| s.to_string()).collect(),
            db_ext: DbExt::default(),
            auth: AuthMode::default(),
            token_user: DEFAULT_TOKEN_USER.to_string(),
            token_env: None,
            token_file: default_token_file(),
            update_checksums: true,
            install: false,
            push: false,
            clean: false,
            sign: false,
            quiet: false,
            verbose: false,
        }
    }

    /// Merge defaults, environment and flags.
    ///
    /// `env` is a snapshot of the process environment; nothing else is read
    /// from the environment after this returns.
    pub fn resolve(cli: &Cli, env: &HashMap<String, String>, cwd: &Path) -> Result<Self> {
        let mut config = Self::new(cwd);

        // Environment
        if let Some(v) = lookup(env, REPO_NAME_ENV) {
            config.repo_name = v.to_string();
        }
        if let Some(v) = lookup(env, REPO_DIR_ENV) {
            config.repo_dir = absolutize(cwd, Path::new(v));
        }
        if let Some(v) = lookup(env, REMOTE_ENV) {
            config.remote = Some(v.to_string());
        }
        if let Some(v) = lookup(env, BRANCH_ENV) {
            config.branch = v.to_string();
        }
        if let Some(v) = lookup(env, MAKEPKG_FLAGS_ENV) {
            config.makepkg_flags = v.split_whitespace().map(String::from).collect();
        }
        if let Some(v) = lookup(env, DB_EXT_ENV) {
            config.db_ext = DbExt::parse(v)?;
        }
        if let Some(v) = lookup(env, AUTH_ENV) {
            config.auth = AuthMode::parse(v)?;
        }
        if let Some(v) = lookup(env, TOKEN_USER_ENV) {
            config.token_user = v.to_string();
        }
        config.token_env = env.get(TOKEN_ENV).and_then(|v| Secret::new(v));

        // Flags
        if let Some(dir) = &cli.directory {
            config.build_dir = absolutize(cwd, dir);
        }
        if let Some(dir) = &cli.repo {
            config.repo_dir = absolutize(cwd, dir);
        }
        if let Some(name) = &cli.repo_name {
            config.repo_name = name.clone();
        }
        if let Some(remote) = &cli.remote {
            config.remote = Some(remote.clone());
        }
        if let Some(branch) = &cli.branch {
            config.branch = branch.clone();
        }
        if cli.token_auth {
            config.auth = AuthMode::Token;
        } else if cli.ssh {
            config.auth = AuthMode::Ssh;
        }
        config.update_checksums = !cli.no_updpkgsums;
        config.install = cli.install;
        config.push = cli.push;
        config.clean = cli.clean;
        config.sign = cli.sign;
        config.quiet = cli.quiet;
        config.verbose = cli.verbose;

        Ok(config)
    }

    /// Path of the package database archive.
    pub fn db_path(&self) -> PathBuf {
        self.repo_dir
            .join(format!("{}.db.tar.{}", self.repo_name, self.db_ext.as_str()))
    }

    /// Path of the files database archive.
    pub fn files_path(&self) -> PathBuf {
        self.repo_dir
            .join(format!("{}.files.tar.{}", self.repo_name, self.db_ext.as_str()))
    }

    pub fn recipe_path(&self) -> PathBuf {
        self.build_dir.join(RECIPE_FILE)
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  repo name:      {}", self.repo_name);
        println!("  build dir:      {}", self.build_dir.display());
        println!("  repo dir:       {}", self.repo_dir.display());
        println!("  index:          {}", self.db_path().display());
        match &self.remote {
            Some(remote) => println!("  remote:         {}", strip_userinfo(remote)),
            None => println!("  remote:         (none)"),
        }
        println!("  branch:         {}", self.branch);
        println!("  makepkg flags:  {}", self.makepkg_flags.join(" "));
        println!("  auth:           {:?}", self.auth);
        if self.auth == AuthMode::Token {
            println!("  token user:     {}", self.token_user);
            let source = if self.token_env.is_some() {
                TOKEN_ENV.to_string()
            } else if self.token_file.is_file() {
                self.token_file.display().to_string()
            } else {
                "NOT FOUND".to_string()
            };
            println!("  token:          {}", source);
        }
        println!(
            "  steps:          updpkgsums={} clean={} install={} sign={} push={}",
            self.update_checksums, self.clean, self.install, self.sign, self.push
        );
    }
}

/// Snapshot of the process environment.
pub fn env_snapshot() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// `$XDG_CONFIG_HOME/pacrepo/token`.
pub fn default_token_file() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("pacrepo")
        .join("token")
}

fn lookup<'a>(env: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
