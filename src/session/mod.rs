// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the turbo-badges project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Session manager
//!
//! The [`SessionManager`] owns the lifecycle of the user's session:
//!
//! - a short-lived access credential obtained from `POST /auth/refresh`, which
//!   relies on a long-lived session cookie kept in the HTTP client's cookie
//!   store,
//! - a single renewal timer armed before the credential expires
//!   (see [`scheduler`]),
//! - an authenticated request helper that renews once and retries once after
//!   a 401 (see [`auth_fetch`]),
//! - the current user's profile and the operations that mutate it
//!   (see [`profile`]).
//!
//! One manager is created at startup and handed to every consumer. It is a
//! cheap `Clone` handle, so tests can build isolated instances.
//!
//! ## Example
//!
//! ```no_run
//! use turbo_badges::config::Config;
//! use turbo_badges::SessionManager;
//!
//! # async fn run() -> Result<(), turbo_badges::SessionError> {
//! let session = SessionManager::new(&Config::default())?;
//! session.bootstrap().await;
//!
//! match session.current_user().await {
//!     Some(user) => println!("Signed in as {}", user.display_name()),
//!     None => println!("Please sign in at {}", session.login_url()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth_fetch;
pub mod errors;
pub mod profile;
pub mod scheduler;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use reqwest::{Client, Response};
use tokio::sync::RwLock;

use crate::config::{ApiConfig, Config, UploadConfig};
use crate::guard::Navigator;
use crate::models::{ApiError, LocalLoginRequest, LoginResponse, RefreshTokenResponse, UserProfile};
use crate::utility::epoch_now;

pub use auth_fetch::{ApiRequest, RequestBody};
pub use errors::{PhotoValidationError, SessionError};
pub use profile::{validate_photo, PhotoUpload};
pub use scheduler::RenewalScheduler;
pub use state::SessionSnapshot;

use state::SessionState;

struct SessionInner {
    api: ApiConfig,
    upload: UploadConfig,
    client: Client,
    state: RwLock<SessionState>,
    scheduler: RenewalScheduler,
}

/// Handle on the process-wide session
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("api", &self.inner.api.base_url)
            .field("renewal_pending", &self.renewal_pending())
            .finish()
    }
}

impl SessionManager {
    /// Build a manager with its own HTTP client.
    ///
    /// The client keeps cookies so the server-side session survives between
    /// requests, and applies the configured request timeout.
    pub fn new(config: &Config) -> Result<Self, SessionError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.api.request_timeout_secs))
            .user_agent(format!("turbo_badges/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(config, client))
    }

    /// Build a manager around an existing HTTP client
    pub fn with_client(config: &Config, client: Client) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                api: config.api.clone(),
                upload: config.upload.clone(),
                client,
                state: RwLock::new(SessionState::default()),
                scheduler: RenewalScheduler::new(config.session.renewal_lead_secs),
            }),
        }
    }

    pub fn api_config(&self) -> &ApiConfig {
        &self.inner.api
    }

    pub(crate) fn upload_config(&self) -> &UploadConfig {
        &self.inner.upload
    }

    pub(crate) fn client(&self) -> &Client {
        &self.inner.client
    }

    /// Absolute URL of an API endpoint
    pub fn endpoint(&self, path: &str) -> String {
        self.inner.api.endpoint(path)
    }

    /// Copy of the current session state
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.read().await.snapshot()
    }

    pub async fn access_credential(&self) -> Option<String> {
        self.inner.state.read().await.access_credential.clone()
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.inner.state.read().await.current_user.clone()
    }

    pub async fn is_bootstrapping(&self) -> bool {
        self.inner.state.read().await.is_bootstrapping
    }

    /// True while a proactive renewal is armed
    pub fn renewal_pending(&self) -> bool {
        self.inner.scheduler.is_pending()
    }

    /// Initial silent sign-in.
    ///
    /// Renews the credential from the session cookie and, when that works,
    /// loads the user's profile. Any failure leaves the session
    /// unauthenticated without raising. The bootstrapping phase ends when
    /// this returns. Only the first call does anything.
    pub async fn bootstrap(&self) {
        {
            let mut state = self.inner.state.write().await;
            if state.bootstrap_started {
                debug!("Session bootstrap already ran");
                return;
            }
            state.bootstrap_started = true;
        }

        debug!("Bootstrapping session");
        let epoch = self.epoch().await;
        if let Some(credential) = self.refresh_in(epoch).await {
            match self.fetch_profile(&credential).await {
                Ok(user) => {
                    let mut state = self.inner.state.write().await;
                    if state.epoch == epoch {
                        info!("Session restored for {}", user.email);
                        state.current_user = Some(user);
                    }
                }
                Err(err) => {
                    warn!("Profile fetch failed during bootstrap: {}", err);
                    self.clear_session().await;
                }
            }
        } else {
            debug!("No active server session, starting unauthenticated");
        }

        self.inner.state.write().await.settle();
    }

    /// Exchange the session cookie for a new access credential.
    ///
    /// On success the credential is stored, the renewal timer is re-armed and
    /// the credential is returned. Any failure returns `None`: callers fall
    /// back to an unauthenticated view.
    pub async fn refresh(&self) -> Option<String> {
        let epoch = self.epoch().await;
        self.refresh_in(epoch).await
    }

    /// Renew within `epoch`: the result is dropped when the session was
    /// cleared in the meantime.
    async fn refresh_in(&self, epoch: u64) -> Option<String> {
        let url = self.endpoint("/auth/refresh");
        debug!("Renewing access credential at {}", url);

        let response = match self.inner.client.post(&url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("Credential renewal request failed: {}", err);
                return None;
            }
        };

        if !response.status().is_success() {
            debug!("Credential renewal refused with status {}", response.status());
            return None;
        }

        let body: RefreshTokenResponse = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                warn!("Malformed credential renewal response: {}", err);
                return None;
            }
        };

        if !self.install_credential(&body.access_token, epoch).await {
            debug!("Session cleared while renewing, renewed credential dropped");
            return None;
        }
        Some(body.access_token)
    }

    /// Location of the identity provider sign-in
    pub fn login_url(&self) -> String {
        self.endpoint("/auth/oauth")
    }

    /// Send the user to the identity provider sign-in
    pub fn login(&self, navigator: &dyn Navigator) {
        navigator.navigate(&self.login_url());
    }

    /// Sign in with an email and password against the local account store.
    ///
    /// The server answers with an access credential and sets the session
    /// cookie. The profile is fetched right away; the session counts as
    /// settled afterwards, like after [`bootstrap`](Self::bootstrap).
    pub async fn login_with_local(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, SessionError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(SessionError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let epoch = self.epoch().await;
        let url = self.endpoint("/auth/local");
        debug!("Local sign-in for {} at {}", email, url);
        let response = self
            .inner
            .client
            .post(&url)
            .json(&LocalLoginRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let err = error_from_response(response, "Login failed").await;
            error!("Local sign-in failed: {}", err);
            return Err(err);
        }

        let body: LoginResponse = response.json().await?;
        if !self.install_credential(&body.access_token, epoch).await {
            warn!("Signed out while signing in, credential dropped");
            self.inner.state.write().await.settle();
            return Err(SessionError::NotAuthenticated);
        }

        match self.fetch_profile(&body.access_token).await {
            Ok(user) => {
                let mut state = self.inner.state.write().await;
                if state.epoch != epoch {
                    warn!("Signed out while signing in, profile dropped");
                    state.settle();
                    return Err(SessionError::NotAuthenticated);
                }
                info!("Signed in as {}", user.email);
                state.current_user = Some(user.clone());
                state.settle();
                Ok(user)
            }
            Err(err) => {
                error!("Profile fetch after local sign-in failed: {}", err);
                let mut state = self.inner.state.write().await;
                state.clear();
                self.inner.scheduler.cancel();
                state.settle();
                Err(err)
            }
        }
    }

    /// Sign out.
    ///
    /// The server-side logout is best effort: whatever its outcome, the
    /// renewal timer is cancelled and the credential and user are cleared.
    pub async fn logout(&self) {
        let url = self.endpoint("/auth/logout");
        match self.inner.client.post(&url).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Server-side session closed")
            }
            Ok(response) => warn!("Server-side logout answered {}", response.status()),
            Err(err) => warn!("Server-side logout failed: {}", err),
        }

        self.clear_session().await;
        info!("Signed out");
    }

    /// Tear down: cancel the pending renewal.
    ///
    /// Dropping the last handle has the same effect.
    pub fn shutdown(&self) {
        if self.inner.scheduler.cancel() {
            debug!("Session shut down with a renewal pending");
        }
    }

    /// Load the profile of the user owning `credential`
    pub(crate) async fn fetch_profile(&self, credential: &str) -> Result<UserProfile, SessionError> {
        let url = self.endpoint("/auth/profile");
        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(credential)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response, "Profile fetch failed").await);
        }

        Ok(response.json::<UserProfile>().await?)
    }

    /// Replace the current user with the server's representation
    pub(crate) async fn replace_user(&self, user: UserProfile) {
        self.inner.state.write().await.current_user = Some(user);
    }

    async fn epoch(&self) -> u64 {
        self.inner.state.read().await.epoch
    }

    /// Drop credential and user and cancel the pending renewal, under the
    /// state lock so no renewal can slip in between.
    async fn clear_session(&self) {
        let mut state = self.inner.state.write().await;
        state.clear();
        self.inner.scheduler.cancel();
    }

    /// Store `credential` and arm its renewal, unless the session was
    /// cleared since `epoch`. Returns false when the credential was dropped.
    async fn install_credential(&self, credential: &str, epoch: u64) -> bool {
        let mut state = self.inner.state.write().await;
        if state.epoch != epoch {
            return false;
        }
        state.access_credential = Some(credential.to_string());
        self.schedule_renewal(credential, epoch);
        true
    }

    fn schedule_renewal(&self, credential: &str, epoch: u64) {
        let session = Arc::downgrade(&self.inner);
        self.inner
            .scheduler
            .schedule(credential, epoch_now(), async move {
                // The timer must not keep a torn-down session alive
                let Some(inner) = session.upgrade() else {
                    return;
                };
                let session = SessionManager { inner };
                if session.refresh_in(epoch).await.is_none() {
                    warn!("Scheduled credential renewal failed, waiting for the next 401");
                }
            });
    }
}

/// Turn a non-success response into a [`SessionError::Server`], using the
/// server's `message` when the body carries one.
pub(crate) async fn error_from_response(response: Response, fallback: &str) -> SessionError {
    let status = response.status();
    let message = response
        .json::<ApiError>()
        .await
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    SessionError::Server { status, message }
}
