//! Commit and push the repository directory.
//!
//! ```text
//! unconfigured -> init -> remote set -> add -> commit (if staged) -> branch -> push
//! ```
//!
//! Whether anything is staged is read from `git diff --cached --quiet`'s
//! exit status, never from git's (translated) messages.
//!
//! Remote discovery and credential injection happen before anything is
//! staged, so a run that can't push never creates a commit. A push that
//! fails after the commit leaves the commit in place; the next `--push`
//! run finds nothing new to commit and pushes it.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::config::Config;
use crate::error::PushError;
use crate::process::{CommandRunner, Invocation};
use crate::ui;

use super::auth::{authenticated_url, strip_userinfo, Credential};
use super::GIT;

const REMOTE_NAME: &str = "origin";

/// Result of a successful push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    /// False when there was nothing new to commit.
    pub committed: bool,
    /// Remote URL with any credentials stripped.
    pub remote: String,
    pub branch: String,
}

/// Commit message for a repository update at `now`.
pub fn commit_message(repo_name: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}: update repository {}",
        repo_name,
        now.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Run the full init → commit → push sequence in `config.repo_dir`.
pub fn push_repository(
    runner: &dyn CommandRunner,
    config: &Config,
    credential: &Credential,
) -> Result<PushOutcome> {
    let dir = config.repo_dir.as_path();

    ensure_work_tree(runner, config)?;
    let remote = configure_remote(runner, config)?;

    let push_url = match credential {
        Credential::Ssh => None,
        Credential::Token { username, token } => {
            Some((authenticated_url(&remote, username, token)?, token))
        }
    };

    git(dir)
        .args(["add", "--all"])
        .run(runner)
        .context(PushError::Git { step: "add" })?;

    let committed = if has_staged_changes(runner, dir)? {
        commit(runner, config, Utc::now())?;
        true
    } else {
        ui::detail(config.quiet, "Nothing to commit");
        false
    };

    git(dir)
        .args(["branch", "-M", config.branch.as_str()])
        .run(runner)
        .context(PushError::Git { step: "branch" })?;

    let push = match &push_url {
        None => git(dir).args(["push", "--set-upstream", REMOTE_NAME, config.branch.as_str()]),
        Some((url, token)) => git(dir)
            .arg("push")
            .secret_arg(url)
            .arg(format!("HEAD:refs/heads/{}", config.branch))
            .hide(token.expose()),
    };
    let push = if config.quiet { push.arg("--quiet") } else { push.interactive() };

    ui::detail(
        config.quiet,
        &format!("Pushing {} to {}", config.branch, strip_userinfo(&remote)),
    );
    push.run(runner).with_context(|| PushError::Push {
        remote: strip_userinfo(&remote),
        branch: config.branch.clone(),
    })?;

    Ok(PushOutcome {
        committed,
        remote: strip_userinfo(&remote),
        branch: config.branch.clone(),
    })
}

fn git(dir: &Path) -> Invocation {
    Invocation::new(GIT).dir(dir)
}

/// `git init` unless the repository directory already is a work tree.
fn ensure_work_tree(runner: &dyn CommandRunner, config: &Config) -> Result<()> {
    let dir = &config.repo_dir;
    if dir.join(".git").exists() {
        return Ok(());
    }

    ui::detail(config.quiet, &format!("Initializing git repository in {}", dir.display()));
    let mut init = git(dir).arg("init");
    if config.quiet {
        init = init.arg("--quiet");
    }
    init.run(runner).context(PushError::Git { step: "init" })?;
    Ok(())
}

/// Make `origin` point at the configured remote, or discover it.
///
/// Returns the remote URL to push to.
fn configure_remote(runner: &dyn CommandRunner, config: &Config) -> Result<String> {
    let dir = config.repo_dir.as_path();

    let current = git(dir)
        .args(["remote", "get-url", REMOTE_NAME])
        .allow_fail()
        .run(runner)?;
    let current = current
        .success()
        .then(|| current.stdout_trimmed().to_string())
        .filter(|url| !url.is_empty());

    match (&config.remote, current) {
        (Some(wanted), Some(existing)) if *wanted == existing => Ok(existing),
        (Some(wanted), Some(_)) => {
            ui::detail(config.quiet, &format!("Updating {} to {}", REMOTE_NAME, strip_userinfo(wanted)));
            git(dir)
                .args(["remote", "set-url", REMOTE_NAME])
                .secret_arg(wanted)
                .run(runner)
                .context(PushError::Git { step: "remote set-url" })?;
            Ok(wanted.clone())
        }
        (Some(wanted), None) => {
            git(dir)
                .args(["remote", "add", REMOTE_NAME])
                .secret_arg(wanted)
                .run(runner)
                .context(PushError::Git { step: "remote add" })?;
            Ok(wanted.clone())
        }
        (None, Some(existing)) => Ok(existing),
        (None, None) => Err(PushError::NoRemote {
            dir: dir.to_path_buf(),
        }
        .into()),
    }
}

/// `git diff --cached --quiet`: exit 0 means the index matches HEAD.
fn has_staged_changes(runner: &dyn CommandRunner, dir: &Path) -> Result<bool> {
    let diff = git(dir)
        .args(["diff", "--cached", "--quiet"])
        .allow_fail()
        .run(runner)?;
    match diff.code {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        _ => Err(anyhow::anyhow!(
            "'git' failed (exit code {}):\n{}",
            diff.code(),
            diff.stderr_trimmed()
        )
        .context(PushError::Git { step: "diff" })),
    }
}

fn commit(runner: &dyn CommandRunner, config: &Config, now: DateTime<Utc>) -> Result<()> {
    let message = commit_message(&config.repo_name, now);
    git(&config.repo_dir)
        .args(["commit", "--quiet", "-m", message.as_str()])
        .run(runner)
        .context(PushError::Git { step: "commit" })?;
    ui::detail(config.quiet, &format!("Committed \"{}\"", message));
    Ok(())
}
