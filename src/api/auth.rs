use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to read token file {path}")]
    TokenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("token file {0} is empty")]
    EmptyTokenFile(PathBuf),
}

/// Supplies the bearer token attached to optionally-authenticated requests.
pub trait TokenSource: Send + Sync {
    fn access_token(&self) -> Result<Option<String>, AuthError>;
}

pub struct StaticToken(pub Option<String>);

impl TokenSource for StaticToken {
    fn access_token(&self) -> Result<Option<String>, AuthError> {
        Ok(self.0.clone().filter(|token| !token.trim().is_empty()))
    }
}

/// Reads the token from a file on every request, so a token refreshed by an
/// external login helper is picked up without a restart.
pub struct TokenFile(pub PathBuf);

impl TokenSource for TokenFile {
    fn access_token(&self) -> Result<Option<String>, AuthError> {
        let raw = fs::read_to_string(&self.0).map_err(|source| AuthError::TokenFile {
            path: self.0.clone(),
            source,
        })?;

        let token = raw.trim();
        if token.is_empty() {
            return Err(AuthError::EmptyTokenFile(self.0.clone()));
        }
        Ok(Some(token.to_owned()))
    }
}

/// Token if one can be obtained; failures degrade to an anonymous request.
pub fn best_effort_token(source: &dyn TokenSource) -> Option<String> {
    match source.access_token() {
        Ok(token) => token,
        Err(error) => {
            tracing::warn!(error = %error, "continuing without authorization");
            None
        }
    }
}
