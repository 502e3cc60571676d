//! Closed error taxonomies returned by the remote backends.

use reqwest::StatusCode;
use thiserror::Error;

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Generic network failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("no internet connection")]
    NoInternet,
    #[error("request timed out")]
    RequestTimeout,
    #[error("could not decode the response")]
    Serialization,
    #[error("server error")]
    ServerError,
    #[error("bad request")]
    BadRequest,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error("too many requests")]
    TooManyRequests,
    #[error("unknown network error")]
    Unknown,
}

impl RemoteError {
    /// Classify a non-success HTTP status
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            408 => Self::RequestTimeout,
            409 => Self::Conflict,
            429 => Self::TooManyRequests,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::RequestTimeout
        } else if err.is_connect() {
            Self::NoInternet
        } else if err.is_decode() {
            Self::Serialization
        } else if let Some(status) = err.status() {
            Self::from_status(status)
        } else {
            Self::Unknown
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(_: serde_json::Error) -> Self {
        Self::Serialization
    }
}

/// Authentication service failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("something went wrong, please try again")]
    UnknownError,
    #[error("no account exists for this email")]
    UserNotFound,
    #[error("invalid email or password")]
    InvalidCredentials,
}

impl AuthError {
    /// Map an identity-service error message (e.g. `EMAIL_NOT_FOUND`) to a kind.
    ///
    /// Messages may carry a detail suffix such as `"WEAK_PASSWORD : Password should be ..."`.
    #[must_use]
    pub fn from_code(message: &str) -> Self {
        let code = message.split(':').next().unwrap_or_default().trim();
        match code {
            "EMAIL_NOT_FOUND" | "USER_DISABLED" => Self::UserNotFound,
            "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL"
            | "MISSING_PASSWORD" => Self::InvalidCredentials,
            _ => Self::UnknownError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(RemoteError::from_status(StatusCode::BAD_REQUEST), RemoteError::BadRequest);
        assert_eq!(RemoteError::from_status(StatusCode::UNAUTHORIZED), RemoteError::Unauthorized);
        assert_eq!(RemoteError::from_status(StatusCode::NOT_FOUND), RemoteError::NotFound);
        assert_eq!(
            RemoteError::from_status(StatusCode::TOO_MANY_REQUESTS),
            RemoteError::TooManyRequests
        );
        assert_eq!(RemoteError::from_status(StatusCode::BAD_GATEWAY), RemoteError::ServerError);
        assert_eq!(RemoteError::from_status(StatusCode::IM_A_TEAPOT), RemoteError::Unknown);
    }

    #[test]
    fn test_auth_error_from_code() {
        assert_eq!(AuthError::from_code("EMAIL_NOT_FOUND"), AuthError::UserNotFound);
        assert_eq!(
            AuthError::from_code("INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            AuthError::from_code("INVALID_PASSWORD : The password is invalid"),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            AuthError::from_code("TOO_MANY_ATTEMPTS_TRY_LATER : later"),
            AuthError::UnknownError
        );
        assert_eq!(AuthError::from_code(""), AuthError::UnknownError);
    }
}
