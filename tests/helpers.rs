//! Shared test utilities for pacrepo tests.

#![allow(dead_code)]

use pacrepo::config::Config;
use pacrepo::process::{CommandResult, CommandRunner, Invocation};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const RECIPE: &str = "pkgname=pkg\npkgver=1.0\npkgrel=1\narch=('x86_64')\nsource=('pkg.service')\n";

/// Test environment with a build directory and a repository directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Directory holding the PKGBUILD
    pub build_dir: PathBuf,
    /// Repository directory packages are published into
    pub repo_dir: PathBuf,
}

impl TestEnv {
    /// Create a new environment with a PKGBUILD in the build directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let build_dir = temp_dir.path().join("build");
        let repo_dir = temp_dir.path().join("repo");
        fs::create_dir_all(&build_dir).expect("Failed to create build dir");
        fs::write(build_dir.join("PKGBUILD"), RECIPE).expect("Failed to write PKGBUILD");

        Self {
            _temp_dir: temp_dir,
            build_dir,
            repo_dir,
        }
    }

    /// Quiet configuration pointing at this environment. The token file
    /// lives in the temp dir and doesn't exist yet.
    pub fn config(&self) -> Config {
        let mut config = Config::new(&self.build_dir);
        config.repo_dir = self.repo_dir.clone();
        config.token_file = self._temp_dir.path().join("token");
        config.quiet = true;
        config
    }

    /// Put an archive into the repository directory as if a previous run
    /// had published it.
    pub fn seed_repo(&self, name: &str) -> PathBuf {
        fs::create_dir_all(&self.repo_dir).expect("Failed to create repo dir");
        let path = self.repo_dir.join(name);
        fs::write(&path, name).expect("Failed to seed archive");
        path
    }
}

/// Every file name directly inside `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

/// Recording stand-in for the real tools.
///
/// - `makepkg` writes `produces` into its working directory
/// - `repo-add` writes the db and files archives, each listing the archive
///   file names it was given
/// - `git remote get-url origin` reports `origin` if set
/// - `git diff --cached --quiet` reports staged changes unless
///   [`FakeRunner::with_nothing_staged`]; `git commit` then fails the way a
///   German-locale git does
/// - everything else succeeds silently
pub struct FakeRunner {
    pub available: Vec<&'static str>,
    pub produces: Vec<&'static str>,
    pub origin: Option<String>,
    pub staged: bool,
    pub calls: RefCell<Vec<Invocation>>,
}

impl FakeRunner {
    pub fn new(produces: &[&'static str]) -> Self {
        Self {
            available: vec!["makepkg", "repo-add", "bsdtar", "updpkgsums", "git", "sudo", "pacman"],
            produces: produces.to_vec(),
            origin: None,
            staged: true,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn without(mut self, program: &str) -> Self {
        self.available.retain(|p| *p != program);
        self
    }

    pub fn with_origin(mut self, url: &str) -> Self {
        self.origin = Some(url.to_string());
        self
    }

    pub fn with_nothing_staged(mut self) -> Self {
        self.staged = false;
        self
    }

    pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.program() == program)
            .cloned()
            .collect()
    }

    /// Git subcommands in call order (`remote get-url`, `add`, ...).
    pub fn git_subcommands(&self) -> Vec<String> {
        self.calls_to("git")
            .iter()
            .map(|c| {
                let argv = c.argv();
                match argv.first() {
                    Some(&"remote") => format!("remote {}", argv.get(1).unwrap_or(&"")),
                    Some(first) => first.to_string(),
                    None => String::new(),
                }
            })
            .collect()
    }

    fn fake_repo_add(&self, inv: &Invocation) {
        let argv = inv.argv();
        let mut positional = argv.iter().filter(|a| !a.starts_with("--"));
        let Some(db) = positional.next() else { return };
        let listing: Vec<String> = positional
            .map(|a| {
                Path::new(a)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
            .collect();
        let listing = listing.join("\n");
        fs::write(db, &listing).expect("fake repo-add: write db");
        fs::write(db.replace(".db.tar.", ".files.tar."), &listing)
            .expect("fake repo-add: write files db");
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, inv: &Invocation) -> anyhow::Result<CommandResult> {
        self.calls.borrow_mut().push(inv.clone());

        match inv.program() {
            "makepkg" => {
                let dir = inv.current_dir().expect("makepkg runs in the build dir");
                for name in &self.produces {
                    fs::write(dir.join(name), name).expect("fake makepkg: write archive");
                }
            }
            "repo-add" => self.fake_repo_add(inv),
            "git" if inv.argv().starts_with(&["remote", "get-url"]) => {
                return Ok(match &self.origin {
                    Some(url) => CommandResult::with_output(0, &format!("{}\n", url), ""),
                    None => CommandResult::with_output(2, "", "error: No such remote 'origin'"),
                });
            }
            "git" if inv.argv().starts_with(&["diff", "--cached"]) => {
                return Ok(CommandResult::with_output(i32::from(self.staged), "", ""));
            }
            "git" if inv.argv().first() == Some(&"commit") && !self.staged => {
                return Ok(CommandResult::with_output(
                    1,
                    "Auf Branch main\nnichts zu committen, Arbeitsverzeichnis unverändert\n",
                    "",
                ));
            }
            _ => {}
        }
        Ok(CommandResult::ok())
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        self.available
            .iter()
            .any(|p| *p == program)
            .then(|| PathBuf::from("/usr/bin").join(program))
    }
}
