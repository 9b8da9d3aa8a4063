//! # Spotify Integration Module
//!
//! The HTTP face of the crate: everything that actually talks to Spotify's
//! services lives in these submodules, each handling one domain of the Web
//! API.
//!
//! ## Core Modules
//!
//! - [`auth`] - OAuth 2.0 PKCE endpoints: authorization-URL construction,
//!   code-for-token exchange, and refresh-token exchange. PKCE needs no
//!   client secret, which is why this client can talk to the accounts
//!   service directly.
//! - [`profile`] - the `/me` endpoint for the authenticated user's profile.
//! - [`search`] - the `/search` endpoint across tracks, artists, albums,
//!   and playlists.
//!
//! ## Error Classification
//!
//! All responses pass through [`read_json`], which folds HTTP status codes
//! into the shared [`ApiError`](crate::error::ApiError) taxonomy: 401
//! becomes `AuthRejected`, other non-success statuses become `ServerError`,
//! and connection-level failures surface as `TransientNetwork`. A 403
//! means the credential is valid but lacks scope, and rate limiting (429)
//! is not an auth problem either; both stay in the `ServerError` class so
//! neither can trigger a token refresh.
//!
//! ## Configuration
//!
//! Endpoints come from a [`SessionConfig`](crate::config::SessionConfig)
//! value rather than ambient environment reads, so tests can point these
//! functions at local mock servers.

pub mod auth;
pub mod profile;
pub mod search;

use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Decodes a JSON response, classifying non-success statuses first.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ApiError::AuthRejected(format!(
            "credential rejected ({})",
            status.as_u16()
        )));
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ApiError::ServerError {
            status: status.as_u16(),
            message,
        });
    }
    response.json::<T>().await.map_err(ApiError::from)
}
