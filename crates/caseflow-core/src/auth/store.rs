//! Session store: the only public way to log in, confirm identity, or log out.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Identity, LoginRequest, TokenResponse};
use crate::router::{Navigator, LOGIN_PATH};

use super::credentials::Credential;
use super::session::Session;

/// Token endpoint of the identity provider
pub const LOGIN_ENDPOINT: &str = "/login/access-token";

/// Profile of the user the credential belongs to
pub const CURRENT_USER_ENDPOINT: &str = "/users/me";

/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionStore {
    session: Arc<Session>,
    api: ApiClient,
    navigator: Arc<dyn Navigator>,
}

impl SessionStore {
    pub fn new(session: Arc<Session>, api: ApiClient, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            session,
            api,
            navigator,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Exchange username/password for a bearer credential, then confirm it.
    ///
    /// A rejected login leaves the session exactly as it was, including any
    /// credential already present. The error goes back to the caller so it
    /// can prompt again. If the token is accepted but the profile cannot be
    /// loaded, the session has already been logged out and that error is
    /// returned instead.
    pub async fn login(&self, request: &LoginRequest) -> Result<Option<Identity>, ApiError> {
        debug!(username = %request.username, "Logging in");
        let token: TokenResponse = match self.api.post_form(LOGIN_ENDPOINT, &request.form_fields()).await {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, username = %request.username, "Login failed");
                return Err(e);
            }
        };

        self.session.establish(Credential::new(token.access_token));
        info!(username = %request.username, "Login successful");

        self.fetch_identity().await.map_err(|e| {
            warn!(error = %e, username = %request.username, "Token accepted but profile could not be loaded");
            e
        })
    }

    /// Fetch the profile for the current credential.
    ///
    /// Does nothing without a credential. Any failure ends the session: if
    /// the profile cannot be confirmed, the credential is not trusted.
    /// The error is still returned for callers that want to report it.
    pub async fn fetch_identity(&self) -> Result<Option<Identity>, ApiError> {
        if !self.session.has_credential() {
            debug!("No credential, skipping identity fetch");
            return Ok(None);
        }

        match self.api.get::<Identity>(CURRENT_USER_ENDPOINT).await {
            Ok(identity) => {
                if self.session.set_identity(identity.clone()) {
                    debug!(user_id = identity.id, "Identity confirmed");
                    Ok(Some(identity))
                } else {
                    Ok(None)
                }
            }
            Err(e) if e.is_auth_expired() && !self.session.has_credential() => {
                // Already cleared and redirected by the response pipeline.
                warn!("Identity rejected, session invalidated");
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch identity, logging out");
                self.logout();
                Err(e)
            }
        }
    }

    /// Clear credential and identity and go to the login view. Safe to call
    /// when already logged out.
    pub fn logout(&self) {
        self.session.clear();
        info!("Logged out");
        self.navigator.navigate(LOGIN_PATH);
    }
}
