use std::path::PathBuf;

use crate::types::SecretKind;

/// Why a secret could not be read, refreshed, or written.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("secret file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("malformed secret record {}: {reason}", path.display())]
    MalformedRecord { path: PathBuf, reason: String },

    #[error("missing {kind} credential")]
    MissingCredential {
        kind: SecretKind,
        #[source]
        source: Box<AuthError>,
    },

    #[error("token endpoint rejected refresh with HTTP {status}")]
    RefreshRejected { status: u16 },

    #[error("token endpoint response is missing {missing}")]
    RefreshResponseInvalid { missing: &'static str },

    #[error("failed to write secret {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("token endpoint request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// No valid access token can be produced right now.
///
/// Every [`AuthError`] collapses into this single outcome for callers of
/// [`crate::TokenManager::get_valid_token`]. The cause is kept as the error
/// source for logging only.
#[derive(Debug, thiserror::Error)]
#[error("access token unavailable")]
pub struct Unavailable {
    #[source]
    cause: AuthError,
}

impl Unavailable {
    pub fn cause(&self) -> &AuthError {
        &self.cause
    }
}

impl From<AuthError> for Unavailable {
    fn from(cause: AuthError) -> Self {
        Self { cause }
    }
}
