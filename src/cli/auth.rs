use std::time::Duration;

use crate::{
    error, info, server,
    session::{AuthSession, FileTokenStore},
    success,
    types::SessionPhase,
    warning,
};

/// How long the login flow waits for the browser callback.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

pub async fn auth(session: AuthSession<FileTokenStore>) {
    let auth_url = session.start_login().await;

    let server_session = session.clone();
    tokio::spawn(async move {
        server::start_callback_server(server_session).await;
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    info!("Waiting for the browser callback...");
    let mut phases = session.subscribe();
    let outcome = tokio::time::timeout(
        LOGIN_TIMEOUT,
        phases.wait_for(|phase| *phase != SessionPhase::Authenticating),
    )
    .await;

    match outcome {
        Ok(Ok(phase)) if *phase == SessionPhase::Authenticated => {
            success!("Authentication successful!");
        }
        Ok(_) => {
            error!("Authentication failed or was declined.");
        }
        Err(_) => {
            error!("Authentication timed out.");
        }
    }
}

pub async fn logout(session: AuthSession<FileTokenStore>) {
    session.logout().await;
    success!("Logged out. Local credentials cleared.");
}
