//! Shared error classification for the session and search layers.
//!
//! Every remote interaction collapses into one of these classes so that
//! callers can decide whether to refresh, retry, or surface the failure.
//! Variants are cloneable because the single-flight refresh fans one
//! outcome out to every waiting caller.

use std::fmt;

use reqwest::StatusCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No valid session; the caller must authenticate first.
    AuthRequired,
    /// The server rejected a code exchange, refresh token, or credential.
    AuthRejected(String),
    /// The user declined the authorization request in the browser.
    AuthDenied,
    /// Connectivity problems or timeouts; safe to retry later.
    TransientNetwork(String),
    /// A non-auth backend failure, including rate limiting.
    ServerError { status: u16, message: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::AuthRequired => write!(f, "authentication required"),
            ApiError::AuthRejected(reason) => write!(f, "authorization rejected: {}", reason),
            ApiError::AuthDenied => write!(f, "authorization was declined by the user"),
            ApiError::TransientNetwork(reason) => write!(f, "network error: {}", reason),
            ApiError::ServerError { status, message } => {
                write!(f, "server error ({}): {}", status, message)
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            return ApiError::TransientNetwork(err.to_string());
        }
        match err.status() {
            Some(StatusCode::UNAUTHORIZED) => ApiError::AuthRejected(err.to_string()),
            Some(status) => ApiError::ServerError {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => ApiError::TransientNetwork(err.to_string()),
        }
    }
}
