use reqwest::Client;

use crate::{config::SessionConfig, error::ApiError, types::UserProfile};

/// Fetches the authenticated user's profile from `/me`.
///
/// Used both to validate a persisted credential at startup and to populate
/// the in-memory profile cache after a successful login. Takes an explicit
/// token rather than going through the transport because the session layer
/// calls this while it is itself deciding whether the token is valid.
pub async fn fetch(
    cfg: &SessionConfig,
    client: &Client,
    token: &str,
) -> Result<UserProfile, ApiError> {
    let url = format!("{}/me", cfg.api_url);
    let response = client
        .get(&url)
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| ApiError::TransientNetwork(e.to_string()))?;
    super::read_json(response).await
}
