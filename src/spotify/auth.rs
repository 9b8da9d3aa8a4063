use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::{config::SessionConfig, error::ApiError, types::Credential};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    error_description: Option<String>,
}

/// Constructs the authorization URL the user's browser is sent to.
///
/// Carries the PKCE S256 challenge and a random `state` parameter that the
/// callback must echo back. The code verifier itself never leaves the
/// client process.
pub fn authorize_url(cfg: &SessionConfig, code_challenge: &str, state: &str) -> String {
    format!(
        "{auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge={code_challenge}&code_challenge_method=S256&scope={scope}&state={state}",
        auth_url = cfg.auth_url,
        client_id = cfg.client_id,
        redirect_uri = cfg.redirect_uri,
        code_challenge = code_challenge,
        scope = cfg.scope,
        state = state
    )
}

/// Exchanges an authorization code for a credential using PKCE.
///
/// Completes the OAuth flow by proving, via the code verifier, that the
/// same client that initiated the authorization is finishing it. The
/// authorization code is single-use and short-lived, so the exchange
/// happens immediately after the callback delivers it.
///
/// # Errors
///
/// A rejected or expired code surfaces as [`ApiError::AuthRejected`];
/// connectivity problems as [`ApiError::TransientNetwork`].
pub async fn exchange_code(
    cfg: &SessionConfig,
    client: &Client,
    code: &str,
    verifier: &str,
) -> Result<Credential, ApiError> {
    token_request(
        cfg,
        client,
        &[
            ("grant_type", "authorization_code"),
            ("client_id", &cfg.client_id),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", &cfg.redirect_uri),
        ],
    )
    .await
}

/// Exchanges a refresh token for a new credential.
///
/// The response may omit the refresh token when the server chooses not to
/// rotate it; the caller is responsible for retaining the previous one in
/// that case.
pub async fn refresh(
    cfg: &SessionConfig,
    client: &Client,
    refresh_token: &str,
) -> Result<Credential, ApiError> {
    token_request(
        cfg,
        client,
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", &cfg.client_id),
        ],
    )
    .await
}

async fn token_request(
    cfg: &SessionConfig,
    client: &Client,
    form: &[(&str, &str)],
) -> Result<Credential, ApiError> {
    let response = client
        .post(&cfg.token_url)
        .form(form)
        .send()
        .await
        .map_err(|e| ApiError::TransientNetwork(e.to_string()))?;

    let status = response.status();
    if status.is_client_error() {
        let body = response.text().await.unwrap_or_default();
        let reason = match serde_json::from_str::<TokenErrorBody>(&body) {
            Ok(err) => err.error_description.unwrap_or(err.error),
            Err(_) => body,
        };
        return Err(ApiError::AuthRejected(reason));
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ApiError::ServerError {
            status: status.as_u16(),
            message,
        });
    }

    let token: TokenResponse = response.json().await.map_err(ApiError::from)?;
    Ok(Credential {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at: Utc::now().timestamp() + token.expires_in,
    })
}
