use std::future::Future;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    error::ApiError,
    search::SearchBackend,
    session::{AuthSession, TokenStore},
    spotify,
    types::{SearchCategory, SearchResults},
};

/// Authenticated access to the remote API.
///
/// Attaches the current access token as a bearer credential; fails fast
/// with [`ApiError::AuthRequired`] when there is no session. When the
/// remote call fails specifically because the credential was rejected, the
/// transport triggers the session's single-flight refresh and retries the
/// original call exactly once with the new token. Any other error class is
/// surfaced immediately.
pub struct AuthenticatedTransport<S: TokenStore> {
    session: AuthSession<S>,
    client: Client,
    api_url: String,
}

impl<S: TokenStore> Clone for AuthenticatedTransport<S> {
    fn clone(&self) -> Self {
        AuthenticatedTransport {
            session: self.session.clone(),
            client: self.client.clone(),
            api_url: self.api_url.clone(),
        }
    }
}

impl<S: TokenStore> AuthenticatedTransport<S> {
    pub fn new(session: AuthSession<S>) -> Self {
        let api_url = session.config().api_url.clone();
        AuthenticatedTransport {
            session,
            client: Client::new(),
            api_url,
        }
    }

    pub fn session(&self) -> &AuthSession<S> {
        &self.session
    }

    /// Performs an authenticated GET against the API and decodes the JSON
    /// body, refreshing and retrying once on a rejected credential.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let token = self.session.access_token().await?;
        match self.send(path, params, &token).await {
            Err(ApiError::AuthRejected(_)) => {
                let credential = self.session.refresh().await?;
                self.send(path, params, &credential.access_token).await
            }
            other => other,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        token: &str,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.api_url, path);
        let response = self
            .client
            .get(&url)
            .query(params)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::TransientNetwork(e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthRejected("access token rejected".to_string()));
        }
        spotify::read_json(response).await
    }
}

impl<S: TokenStore> SearchBackend for AuthenticatedTransport<S> {
    fn search(
        &self,
        query: &str,
        category: SearchCategory,
        limit: u32,
    ) -> impl Future<Output = Result<SearchResults, ApiError>> + Send {
        spotify::search::search(self, query, category, limit)
    }
}
