//! Token resolution and remote URL rewriting.
//!
//! Tokens are wrapped in [`Secret`] as soon as they are read so they can't
//! end up in `Debug` output, logs or error messages.

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::config::TOKEN_ENV;
use crate::error::AuthError;

/// A credential value with a redacted `Debug` impl.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a raw value, trimming surrounding whitespace. Blank values are
    /// rejected.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// How the repository directory authenticates against its remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Ambient SSH keys (or whatever git is already configured with).
    Ssh,
    /// Username and token injected into an https remote.
    Token { username: String, token: Secret },
}

/// Resolve the access token.
///
/// A non-blank environment value wins over the token file. If neither
/// yields a token the error names both sources.
pub fn resolve_token(env_value: Option<&Secret>, token_file: &Path) -> Result<Secret> {
    if let Some(token) = env_value {
        tracing::debug!("using token from {}", TOKEN_ENV);
        return Ok(token.clone());
    }

    if token_file.is_file() {
        let content = fs::read_to_string(token_file)
            .with_context(|| format!("Failed to read token file {}", token_file.display()))?;
        if let Some(token) = Secret::new(&content) {
            tracing::debug!(file = %token_file.display(), "using token from file");
            return Ok(token);
        }
    }

    Err(AuthError::TokenMissing {
        env_var: TOKEN_ENV,
        file: token_file.to_path_buf(),
    }
    .into())
}

/// Rewrite an https remote to embed `username` and `token`.
///
/// Any userinfo already present in the URL is replaced. Host, port and path
/// are kept verbatim. Every other scheme is rejected.
pub fn authenticated_url(
    remote: &str,
    username: &str,
    token: &Secret,
) -> Result<String, AuthError> {
    const SCHEME: &str = "https://";

    let incompatible = || AuthError::IncompatibleRemote {
        remote: strip_userinfo(remote),
    };

    let rest = match remote.get(..SCHEME.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(SCHEME) => &remote[SCHEME.len()..],
        _ => return Err(incompatible()),
    };

    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };

    let host = match authority.rfind('@') {
        Some(idx) => &authority[idx + 1..],
        None => authority,
    };
    if host.is_empty() {
        return Err(incompatible());
    }

    Ok(format!(
        "{}{}:{}@{}{}",
        &remote[..SCHEME.len()],
        username,
        token.expose(),
        host,
        path
    ))
}

/// Drop any userinfo from a URL so it is safe to print.
pub fn strip_userinfo(remote: &str) -> String {
    let Some(scheme_end) = remote.find("://") else {
        return remote.to_string();
    };
    let (scheme, rest) = remote.split_at(scheme_end + 3);
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{}{}", scheme, &rest[at + 1..]),
        None => remote.to_string(),
    }
}
