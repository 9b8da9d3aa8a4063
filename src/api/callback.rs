use std::collections::HashMap;

use axum::{Extension, extract::Query, response::Html};

use crate::{
    error::ApiError,
    session::{AuthSession, FileTokenStore},
    warning,
};

/// Handles the OAuth redirect from the authorization server.
///
/// A callback carrying an `error` parameter means the user declined or the
/// server refused; the pending login is abandoned either way. A callback
/// with a `code` completes the PKCE exchange through the session.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(session): Extension<AuthSession<FileTokenStore>>,
) -> Html<&'static str> {
    if let Some(error) = params.get("error") {
        return match session.handle_callback_error(error).await {
            ApiError::AuthDenied => {
                warning!("Authorization was declined by the user.");
                Html("<h4>Access denied. You can close this window.</h4>")
            }
            e => {
                warning!("Authorization failed: {}", e);
                Html("<h4>Login failed.</h4>")
            }
        };
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    match session
        .handle_callback(code, params.get("state").map(String::as_str))
        .await
    {
        Ok(()) => Html("<h2>Authentication successful.</h2><p>Close browser window.</p>"),
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}
