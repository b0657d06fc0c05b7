//! Error taxonomy for the build-and-publish pipeline.
//!
//! Every variant is fatal. Messages never contain token values.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid configuration value from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}: expected one of {expected}")]
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// The host is missing something the pipeline needs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreflightError {
    #[error("preflight failed: {count} check(s) failed ({names})")]
    ChecksFailed { count: usize, names: String },
}

/// The package build step failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("checksum refresh failed")]
    Checksums,

    #[error("package build failed in {}", dir.display())]
    Makepkg { dir: PathBuf },

    #[error("package install failed")]
    Install,

    #[error("no built packages found in {}", dir.display())]
    NoPackages { dir: PathBuf },
}

/// The repository index could not be rebuilt.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PublishError {
    #[error("no package archives found in {} to index", dir.display())]
    NothingToIndex { dir: PathBuf },

    #[error("repo-add failed to rebuild {}", db.display())]
    Index { db: PathBuf },
}

/// Token authentication could not be set up.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error(
        "token authentication requested but no token found: set {env_var} or write the token to {}",
        file.display()
    )]
    TokenMissing { env_var: &'static str, file: PathBuf },

    #[error("remote '{remote}' is incompatible with token authentication (only https:// remotes are supported)")]
    IncompatibleRemote { remote: String },
}

/// The repository could not be pushed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PushError {
    #[error(
        "no git remote configured for {}: pass --remote <url> or set PACREPO_REMOTE",
        dir.display()
    )]
    NoRemote { dir: PathBuf },

    #[error("git {step} failed")]
    Git { step: &'static str },

    #[error("could not push {branch} to {remote}; the local commit was kept, rerun with --push to retry")]
    Push { remote: String, branch: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_missing_names_both_sources() {
        let err = AuthError::TokenMissing {
            env_var: "PACREPO_TOKEN",
            file: PathBuf::from("/home/u/.config/pacrepo/token"),
        };
        let msg = err.to_string();
        assert!(msg.contains("PACREPO_TOKEN"));
        assert!(msg.contains("/home/u/.config/pacrepo/token"));
    }

    #[test]
    fn no_packages_message() {
        let err = BuildError::NoPackages {
            dir: PathBuf::from("/build"),
        };
        assert_eq!(err.to_string(), "no built packages found in /build");
    }

    #[test]
    fn no_remote_gives_instructions() {
        let err = PushError::NoRemote {
            dir: PathBuf::from("repo"),
        };
        assert!(err.to_string().contains("--remote"));
    }

    #[test]
    fn push_failure_says_commit_was_kept() {
        let err = PushError::Push {
            remote: "https://github.com/acme/pkgs.git".into(),
            branch: "main".into(),
        };
        assert_eq!(
            err.to_string(),
            "could not push main to https://github.com/acme/pkgs.git; the local commit was kept, rerun with --push to retry"
        );
    }
}
