use std::sync::Arc;

use reqwest::Client;
use tokio::sync::{Mutex, watch};

use crate::{
    config::SessionConfig,
    error::ApiError,
    session::TokenStore,
    spotify, utils, warning,
    types::{Credential, PendingLogin, SessionPhase, SessionState, UserProfile},
};

type RefreshOutcome = Result<Credential, ApiError>;

struct SessionInner {
    state: SessionState,
    profile: Option<UserProfile>,
    /// Receiver for the in-flight refresh, if one exists. Concurrent refresh
    /// requesters clone this instead of starting a second round trip.
    refresh_rx: Option<watch::Receiver<Option<RefreshOutcome>>>,
    /// Bumped on logout so a refresh or exchange finishing afterwards cannot
    /// resurrect the session.
    epoch: u64,
}

/// The OAuth session state machine.
///
/// Exclusively owns the credential and its transitions: authorization-URL
/// issuance, code exchange, proactive and reactive refresh, and logout.
/// Cloning is cheap and all clones share the same state.
///
/// The refresh path is single-flight: no matter how many callers detect an
/// expired or rejected token at the same time, exactly one refresh request
/// goes out, and every waiter observes that one outcome. A refresh, once
/// started, runs on its own task and always completes even if the caller
/// that triggered it goes away.
pub struct AuthSession<S: TokenStore> {
    cfg: SessionConfig,
    store: Arc<S>,
    client: Client,
    inner: Arc<Mutex<SessionInner>>,
    phase_tx: Arc<watch::Sender<SessionPhase>>,
}

impl<S: TokenStore> Clone for AuthSession<S> {
    fn clone(&self) -> Self {
        AuthSession {
            cfg: self.cfg.clone(),
            store: Arc::clone(&self.store),
            client: self.client.clone(),
            inner: Arc::clone(&self.inner),
            phase_tx: Arc::clone(&self.phase_tx),
        }
    }
}

impl<S: TokenStore> AuthSession<S> {
    pub fn new(cfg: SessionConfig, store: S) -> Self {
        let (phase_tx, _) = watch::channel(SessionPhase::Unauthenticated);
        AuthSession {
            cfg,
            store: Arc::new(store),
            client: Client::new(),
            inner: Arc::new(Mutex::new(SessionInner {
                state: SessionState::Unauthenticated,
                profile: None,
                refresh_rx: None,
                epoch: 0,
            })),
            phase_tx: Arc::new(phase_tx),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.cfg
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Subscribes to session phase changes. The receiver always reports the
    /// current phase; use this for reacting to login and logout instead of
    /// polling.
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.phase_tx.subscribe()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.inner.lock().await.state.phase()
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(self.inner.lock().await.state, SessionState::Authenticated(_))
    }

    /// The cached user profile, if one was fetched for this session.
    pub async fn current_user(&self) -> Option<UserProfile> {
        self.inner.lock().await.profile.clone()
    }

    /// Begins a login: generates fresh PKCE material and returns the
    /// authorization URL the user's browser must visit.
    pub async fn start_login(&self) -> String {
        let code_verifier = utils::generate_code_verifier();
        let code_challenge = utils::generate_code_challenge(&code_verifier);
        let state = utils::generate_state_param();
        let url = spotify::auth::authorize_url(&self.cfg, &code_challenge, &state);

        let mut inner = self.inner.lock().await;
        Self::apply_state(
            &mut inner,
            &self.phase_tx,
            SessionState::Authenticating(PendingLogin {
                code_verifier,
                state,
            }),
        );
        url
    }

    /// Abandons a login in progress, returning to `Unauthenticated`.
    pub async fn cancel_login(&self) {
        let mut inner = self.inner.lock().await;
        if matches!(inner.state, SessionState::Authenticating(_)) {
            Self::apply_state(&mut inner, &self.phase_tx, SessionState::Unauthenticated);
        }
    }

    /// Completes the login with the authorization code from the callback.
    ///
    /// On success the credential is stored and a profile fetch is started in
    /// the background; a profile failure does not revert authentication. On
    /// failure the session returns to `Unauthenticated`.
    pub async fn handle_callback(&self, code: &str, state: Option<&str>) -> Result<(), ApiError> {
        let (pending, epoch) = {
            let inner = self.inner.lock().await;
            match &inner.state {
                SessionState::Authenticating(p) => (p.clone(), inner.epoch),
                _ => {
                    return Err(ApiError::AuthRejected(
                        "no login in progress".to_string(),
                    ));
                }
            }
        };

        if let Some(state) = state {
            if state != pending.state {
                self.cancel_login().await;
                return Err(ApiError::AuthRejected("state parameter mismatch".to_string()));
            }
        }

        match spotify::auth::exchange_code(&self.cfg, &self.client, code, &pending.code_verifier)
            .await
        {
            Ok(credential) => {
                let applied = {
                    let mut inner = self.inner.lock().await;
                    if inner.epoch == epoch {
                        Self::apply_state(
                            &mut inner,
                            &self.phase_tx,
                            SessionState::Authenticated(credential.clone()),
                        );
                        true
                    } else {
                        false
                    }
                };
                if applied {
                    if let Err(e) = self.store.put(credential.clone()).await {
                        warning!("Failed to persist credentials: {}", e);
                    }
                    self.spawn_profile_fetch(credential.access_token, epoch);
                }
                Ok(())
            }
            Err(e) => {
                let mut inner = self.inner.lock().await;
                if inner.epoch == epoch {
                    Self::apply_state(&mut inner, &self.phase_tx, SessionState::Unauthenticated);
                }
                Err(e)
            }
        }
    }

    /// Classifies a callback that carried an error instead of a code and
    /// abandons the pending login.
    pub async fn handle_callback_error(&self, error: &str) -> ApiError {
        self.cancel_login().await;
        if error == "access_denied" {
            ApiError::AuthDenied
        } else {
            ApiError::AuthRejected(error.to_string())
        }
    }

    /// Adopts a credential without any network traffic, entering
    /// `Authenticated` or `Expired` depending on its expiry.
    pub async fn restore(&self, credential: Credential) {
        let mut inner = self.inner.lock().await;
        let state = if credential.is_expired() {
            SessionState::Expired(credential)
        } else {
            SessionState::Authenticated(credential)
        };
        Self::apply_state(&mut inner, &self.phase_tx, state);
    }

    /// Startup probe: looks for a persisted credential and validates it with
    /// a single profile fetch, attempting exactly one refresh before falling
    /// back to `Unauthenticated`. Returns whether a session was established.
    ///
    /// A login in progress is left untouched, and a `logout()` racing the
    /// probe wins: once the epoch moves, the probe writes nothing back and
    /// reports no session.
    pub async fn check_status(&self) -> bool {
        let epoch = {
            let inner = self.inner.lock().await;
            if matches!(inner.state, SessionState::Authenticating(_)) {
                return false;
            }
            inner.epoch
        };

        let Some(credential) = self.store.get().await else {
            let mut inner = self.inner.lock().await;
            if inner.epoch == epoch {
                Self::apply_state(&mut inner, &self.phase_tx, SessionState::Unauthenticated);
            }
            return false;
        };

        {
            let mut inner = self.inner.lock().await;
            if inner.epoch != epoch {
                return false;
            }
            let state = if credential.is_expired() {
                SessionState::Expired(credential.clone())
            } else {
                SessionState::Authenticated(credential.clone())
            };
            Self::apply_state(&mut inner, &self.phase_tx, state);
        }

        if !credential.is_expired() {
            match spotify::profile::fetch(&self.cfg, &self.client, &credential.access_token).await
            {
                Ok(profile) => {
                    let mut inner = self.inner.lock().await;
                    if inner.epoch != epoch {
                        return false;
                    }
                    inner.profile = Some(profile);
                    return true;
                }
                Err(_) => {} // fall through to the one refresh attempt
            }
        }

        match self.refresh().await {
            Ok(credential) => {
                // best-effort; the session stands even without a profile
                let profile =
                    spotify::profile::fetch(&self.cfg, &self.client, &credential.access_token)
                        .await
                        .ok();
                let mut inner = self.inner.lock().await;
                if inner.epoch != epoch {
                    return false;
                }
                if let Some(profile) = profile {
                    inner.profile = Some(profile);
                }
                true
            }
            Err(_) => false,
        }
    }

    /// Returns a usable access token, refreshing first when the current one
    /// is expired or a refresh is already under way.
    pub async fn access_token(&self) -> Result<String, ApiError> {
        {
            let inner = self.inner.lock().await;
            match &inner.state {
                SessionState::Authenticated(c) if !c.is_expired() => {
                    return Ok(c.access_token.clone());
                }
                SessionState::Authenticated(_)
                | SessionState::Expired(_)
                | SessionState::Refreshing => {}
                SessionState::Unauthenticated | SessionState::Authenticating(_) => {
                    return Err(ApiError::AuthRequired);
                }
            }
        }
        let credential = self.refresh().await?;
        Ok(credential.access_token)
    }

    /// Refreshes the credential, single-flight.
    ///
    /// If a refresh is already in flight the caller attaches to its outcome;
    /// otherwise one refresh task is spawned. Every waiter gets the same
    /// resulting credential or the same failure. A rejected refresh clears
    /// the credentials and leaves the session `Unauthenticated`; a transient
    /// failure keeps the stale credential so a later call can retry.
    pub async fn refresh(&self) -> Result<Credential, ApiError> {
        let rx = {
            let mut inner = self.inner.lock().await;
            if let Some(rx) = inner.refresh_rx.clone() {
                rx
            } else {
                let stale = match &inner.state {
                    SessionState::Authenticated(c) | SessionState::Expired(c) => c.clone(),
                    _ => return Err(ApiError::AuthRequired),
                };
                let Some(refresh_token) = stale.refresh_token.clone() else {
                    Self::apply_state(&mut inner, &self.phase_tx, SessionState::Unauthenticated);
                    inner.profile = None;
                    drop(inner);
                    if let Err(e) = self.store.clear().await {
                        warning!("Failed to clear credentials: {}", e);
                    }
                    return Err(ApiError::AuthRejected(
                        "no refresh token available".to_string(),
                    ));
                };
                let (tx, rx) = watch::channel(None);
                inner.refresh_rx = Some(rx.clone());
                let epoch = inner.epoch;
                Self::apply_state(&mut inner, &self.phase_tx, SessionState::Refreshing);
                // the refresh runs to completion even if this caller goes away
                let session = self.clone();
                tokio::spawn(async move {
                    session.run_refresh(stale, refresh_token, tx, epoch).await;
                });
                rx
            }
        };
        Self::await_refresh(rx).await
    }

    async fn run_refresh(
        &self,
        stale: Credential,
        refresh_token: String,
        tx: watch::Sender<Option<RefreshOutcome>>,
        epoch: u64,
    ) {
        let result = spotify::auth::refresh(&self.cfg, &self.client, &refresh_token)
            .await
            .map(|mut credential| {
                // the server may not rotate the refresh token every time
                if credential.refresh_token.is_none() {
                    credential.refresh_token = Some(refresh_token.clone());
                }
                credential
            });

        let applied = {
            let mut inner = self.inner.lock().await;
            inner.refresh_rx = None;
            if inner.epoch != epoch {
                false
            } else {
                match &result {
                    Ok(credential) => {
                        Self::apply_state(
                            &mut inner,
                            &self.phase_tx,
                            SessionState::Authenticated(credential.clone()),
                        );
                    }
                    Err(ApiError::AuthRejected(_))
                    | Err(ApiError::AuthDenied)
                    | Err(ApiError::AuthRequired) => {
                        Self::apply_state(
                            &mut inner,
                            &self.phase_tx,
                            SessionState::Unauthenticated,
                        );
                        inner.profile = None;
                    }
                    Err(_) => {
                        Self::apply_state(
                            &mut inner,
                            &self.phase_tx,
                            SessionState::Expired(stale.clone()),
                        );
                    }
                }
                true
            }
        };

        if applied {
            match &result {
                Ok(credential) => {
                    if let Err(e) = self.store.put(credential.clone()).await {
                        warning!("Failed to persist refreshed credentials: {}", e);
                    }
                }
                Err(ApiError::AuthRejected(_))
                | Err(ApiError::AuthDenied)
                | Err(ApiError::AuthRequired) => {
                    if let Err(e) = self.store.clear().await {
                        warning!("Failed to clear credentials: {}", e);
                    }
                }
                Err(_) => {}
            }
        }

        let _ = tx.send(Some(result));
    }

    async fn await_refresh(
        mut rx: watch::Receiver<Option<RefreshOutcome>>,
    ) -> Result<Credential, ApiError> {
        match rx.wait_for(|outcome| outcome.is_some()).await {
            Ok(outcome) => match outcome.as_ref() {
                Some(result) => result.clone(),
                None => Err(ApiError::TransientNetwork(
                    "refresh outcome unavailable".to_string(),
                )),
            },
            Err(_) => Err(ApiError::TransientNetwork(
                "refresh task dropped".to_string(),
            )),
        }
    }

    /// Ends the session. Idempotent and local-first: local state and stored
    /// credentials are always cleared, whatever else is going on.
    pub async fn logout(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.epoch += 1;
            inner.profile = None;
            inner.refresh_rx = None;
            Self::apply_state(&mut inner, &self.phase_tx, SessionState::Unauthenticated);
        }
        if let Err(e) = self.store.clear().await {
            warning!("Failed to clear stored credentials: {}", e);
        }
    }

    fn spawn_profile_fetch(&self, access_token: String, epoch: u64) {
        let cfg = self.cfg.clone();
        let client = self.client.clone();
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            match spotify::profile::fetch(&cfg, &client, &access_token).await {
                Ok(profile) => {
                    let mut inner = inner.lock().await;
                    // a logout since the fetch started wins
                    if inner.epoch == epoch {
                        inner.profile = Some(profile);
                    }
                }
                Err(e) => warning!("Failed to fetch user profile: {}", e),
            }
        });
    }

    fn apply_state(
        inner: &mut SessionInner,
        phase_tx: &watch::Sender<SessionPhase>,
        state: SessionState,
    ) {
        let phase = state.phase();
        inner.state = state;
        phase_tx.send_replace(phase);
    }
}
