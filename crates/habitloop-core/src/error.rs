use habitloop_remote::{AuthError, RemoteError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure outcome of a repository or screen operation
#[derive(Debug, Error)]
pub enum Error {
    /// Local cache failure; not expected in normal operation
    #[error(transparent)]
    Cache(#[from] anyhow::Error),
    #[error("remote sync failed: {0}")]
    Remote(#[from] RemoteError),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("not signed in")]
    NotSignedIn,
}

impl Error {
    /// The auth kind to show to the user for a failed sign-in/up/reset
    #[must_use]
    pub fn auth_kind(&self) -> AuthError {
        match self {
            Self::Auth(kind) => *kind,
            _ => AuthError::UnknownError,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Remote(err.into())
    }
}
