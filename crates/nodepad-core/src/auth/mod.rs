//! Session lifecycle: login, restore, token attachment and forced logout.

mod navigation;
mod store;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::models::User;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};
use crate::{Error, Result};

pub use navigation::{NavigationSink, Route};
pub use store::{CredentialStore, CredentialToken, MemoryCredentialStore, TOKEN_KEY};

const ME_PATH: &str = "/auth/me";
const REGISTER_PATH: &str = "/auth/register";
const LOGIN_PATH: &str = "/auth/login";

/// Who is signed in, if anyone.
///
/// Authenticated iff a token is present that the server has accepted;
/// a token the server rejected never stays in here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<CredentialToken>,
    user: Option<User>,
}

impl Session {
    fn authenticated(token: CredentialToken, user: User) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
        }
    }

    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub const fn token(&self) -> Option<&CredentialToken> {
        self.token.as_ref()
    }

    pub const fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}

/// Observable session state.
///
/// `generation` increases on every transition (login, restore, logout,
/// forced logout) so in-flight work can tell whether it is still current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session: Session,
    pub loading: bool,
    pub generation: u64,
}

/// Server confirmation returned by `/auth/register`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Owns the session and is the only writer of the credential token.
pub struct SessionManager<S: CredentialStore> {
    transport: Arc<dyn HttpTransport>,
    store: S,
    navigation: Arc<dyn NavigationSink>,
    state: watch::Sender<SessionSnapshot>,
}

impl<S: CredentialStore> SessionManager<S> {
    /// Starts in the loading state; call [`SessionManager::restore`] once at startup.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: S,
        navigation: Arc<dyn NavigationSink>,
    ) -> Self {
        let (state, _) = watch::channel(SessionSnapshot {
            session: Session::default(),
            loading: true,
            generation: 0,
        });
        Self {
            transport,
            store,
            navigation,
            state,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().session.is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().session.current_user().cloned()
    }

    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Resolves once `restore` (or any other transition) has settled the session.
    pub async fn wait_until_ready(&self) -> SessionSnapshot {
        let mut receiver = self.state.subscribe();
        // cannot fail: the sender lives in `self`
        let _ = receiver.wait_for(|state| !state.loading).await;
        self.snapshot()
    }

    /// Validate a persisted token against `/auth/me`.
    ///
    /// Any failure discards the token and leaves the session signed out;
    /// a rejected token is a forced logout and also navigates to the login
    /// view. Clears the loading flag either way.
    pub async fn restore(&self) -> Option<User> {
        let started = self.generation();
        let outcome = match self.store.load_token() {
            Ok(Some(token)) => Some(
                self.validate_token(&token)
                    .await
                    .map(|user| (token, user)),
            ),
            Ok(None) => None,
            Err(error) => Some(Err(error)),
        };

        if let Some(Err(error)) = &outcome {
            tracing::warn!("Persisted session could not be validated: {}", error);
        }
        let rejected = matches!(&outcome, Some(Err(error)) if error.is_session_expired());

        let mut superseded = false;
        let mut discard = false;
        self.state.send_modify(|state| {
            state.loading = false;
            if state.generation != started {
                superseded = true;
                return;
            }
            match outcome {
                Some(Ok((token, user))) => {
                    state.session = Session::authenticated(token, user);
                    state.generation += 1;
                }
                Some(Err(_)) => discard = true,
                None => {}
            }
        });

        if superseded {
            tracing::debug!("Session changed during restore; keeping the newer session");
        }
        if discard {
            self.discard_stored_token();
            if rejected {
                self.navigation.navigate(Route::Login);
            }
        }

        let user = self.current_user();
        if let Some(user) = &user {
            tracing::info!("Restored session for {}", user.username);
        }
        user
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, username: &str, password: &str) -> Result<Registration> {
        let credentials = Credentials::validated(username, password)?;
        let request = ApiRequest::post(REGISTER_PATH).with_json(&credentials)?;
        let response = self.transport.send(request).await?.error_for_status()?;

        let registration = if response.body().trim().is_empty() {
            Registration::default()
        } else {
            response.decode::<Registration>()?
        };

        tracing::info!("Registered account {}", credentials.username);
        self.navigation.navigate(Route::Login);
        Ok(registration)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let credentials = Credentials::validated(username, password)?;
        let request = ApiRequest::post(LOGIN_PATH).with_json(&credentials)?;
        let response = self.transport.send(request).await?.error_for_status()?;
        let payload = response.decode::<LoginResponse>()?;
        let token = CredentialToken::new(payload.token).map_err(|_| {
            Error::MalformedResponse("Login response did not include a usable token".to_string())
        })?;

        self.store.save_token(&token)?;
        let user = payload.user;
        self.state.send_modify(|state| {
            state.session = Session::authenticated(token, user.clone());
            state.loading = false;
            state.generation += 1;
        });

        tracing::info!("Signed in as {}", user.username);
        self.navigation.navigate(Route::Home);
        Ok(user)
    }

    /// Local sign-out; never fails.
    pub fn logout(&self) {
        self.tear_down();
        tracing::info!("Signed out");
    }

    /// Add the bearer token to `request` when one is present.
    pub fn attach(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(token) = self.state.borrow().session.token() {
            request.set_bearer(token);
        }
        request
    }

    /// The server rejected the token: drop it and send the user to login.
    pub fn handle_unauthorized(&self) {
        tracing::warn!("Server rejected the session token; signing out");
        self.tear_down();
    }

    /// Send an authenticated request.
    ///
    /// Waits for restore to settle, refuses to run signed out, escalates
    /// 401/403 into [`SessionManager::handle_unauthorized`], and drops
    /// responses that arrive after the session changed.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let snapshot = self.wait_until_ready().await;
        if !snapshot.session.is_authenticated() {
            return Err(Error::NotAuthenticated);
        }

        let request = self.attach(request);
        let path = request.path().to_string();
        let response = self.transport.send(request).await?;

        if self.generation() != snapshot.generation {
            tracing::debug!(path = %path, "Dropping response issued under a previous session");
            return Err(Error::SessionChanged);
        }

        match response.error_for_status() {
            Err(error @ Error::AuthRejected(_)) => {
                self.handle_unauthorized();
                Err(error)
            }
            other => other,
        }
    }

    async fn validate_token(&self, token: &CredentialToken) -> Result<User> {
        let mut request = ApiRequest::get(ME_PATH);
        request.set_bearer(token);
        let response = self.transport.send(request).await?.error_for_status()?;
        Ok(response.decode::<MeResponse>()?.user)
    }

    fn tear_down(&self) {
        self.discard_stored_token();
        self.state.send_modify(|state| {
            state.session = Session::default();
            state.loading = false;
            state.generation += 1;
        });
        self.navigation.navigate(Route::Login);
    }

    fn discard_stored_token(&self) {
        if let Err(error) = self.store.clear_token() {
            tracing::warn!("Failed to clear persisted credential token: {}", error);
        }
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

impl<'a> Credentials<'a> {
    fn validated(username: &'a str, password: &'a str) -> Result<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::Validation("Username is required".to_string()));
        }
        if password.trim().is_empty() {
            return Err(Error::Validation("Password is required".to_string()));
        }
        Ok(Self { username, password })
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    user: User,
}

#[derive(Deserialize)]
struct MeResponse {
    user: User,
}
