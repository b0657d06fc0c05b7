//! Git publishing of the repository directory.

pub mod auth;
pub mod publish;

use anyhow::Result;

use crate::config::{AuthMode, Config};

pub use auth::{Credential, Secret};
pub use publish::{push_repository, PushOutcome};

pub const GIT: &str = "git";

/// Resolve the credential `--push` will use.
///
/// Runs before anything is built so a missing token or a remote that can't
/// carry one fails the run immediately.
pub fn resolve_credential(config: &Config) -> Result<Credential> {
    match config.auth {
        AuthMode::Ssh => Ok(Credential::Ssh),
        AuthMode::Token => {
            let token = auth::resolve_token(config.token_env.as_ref(), &config.token_file)?;
            if let Some(remote) = &config.remote {
                auth::authenticated_url(remote, &config.token_user, &token)?;
            }
            Ok(Credential::Token {
                username: config.token_user.clone(),
                token,
            })
        }
    }
}
