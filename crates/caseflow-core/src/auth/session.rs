//! Process-wide session state: the current credential and identity.
//!
//! There is one `Session` per application, shared behind an `Arc`. Reads are
//! public; every transition is crate-internal so that only the session store
//! and the HTTP pipeline's failure stage can change it.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::models::Identity;

use super::credentials::{Credential, TokenStore};

/// Lifecycle of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No credential
    Anonymous,
    /// Credential present, identity not yet confirmed
    Authenticating,
    /// Credential and identity present
    Authenticated,
    /// Credential rejected by the server; settles back to `Anonymous`
    Invalid,
}

#[derive(Debug)]
struct SessionData {
    credential: Option<Credential>,
    identity: Option<Identity>,
    invalidated: bool,
}

impl SessionData {
    fn state(&self) -> SessionState {
        match (&self.credential, &self.identity) {
            _ if self.invalidated => SessionState::Invalid,
            (None, _) => SessionState::Anonymous,
            (Some(_), None) => SessionState::Authenticating,
            (Some(_), Some(_)) => SessionState::Authenticated,
        }
    }
}

pub struct Session {
    data: RwLock<SessionData>,
    storage: Arc<dyn TokenStore>,
}

impl Session {
    /// Start a session from whatever credential the durable store holds.
    ///
    /// The identity is never persisted; it is fetched again on first navigation.
    pub fn restore(storage: Arc<dyn TokenStore>) -> Self {
        let credential = match storage.load() {
            Ok(token) => token.filter(|t| !t.is_empty()).map(Credential::new),
            Err(e) => {
                warn!(error = %e, "Failed to load stored credential, starting anonymous");
                None
            }
        };
        debug!(has_credential = credential.is_some(), "Session restored");

        Self {
            data: RwLock::new(SessionData {
                credential,
                identity: None,
                invalidated: false,
            }),
            storage,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn credential(&self) -> Option<Credential> {
        self.read().credential.clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.read().identity.clone()
    }

    pub fn has_credential(&self) -> bool {
        self.read().credential.is_some()
    }

    pub fn has_identity(&self) -> bool {
        self.read().identity.is_some()
    }

    pub fn state(&self) -> SessionState {
        self.read().state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Adopt a freshly issued credential. Any previous identity belongs to
    /// the old credential and is dropped.
    pub(crate) fn establish(&self, credential: Credential) {
        if let Err(e) = self.storage.save(credential.as_str()) {
            warn!(error = %e, "Failed to persist credential");
        }
        let mut data = self.write();
        data.credential = Some(credential);
        data.identity = None;
        data.invalidated = false;
    }

    /// Record the fetched identity. Refused when the credential has been
    /// cleared in the meantime, so an identity never outlives its credential.
    pub(crate) fn set_identity(&self, identity: Identity) -> bool {
        let mut data = self.write();
        if data.credential.is_none() {
            debug!("Discarding identity that arrived after the credential was cleared");
            return false;
        }
        data.identity = Some(identity);
        true
    }

    /// The server rejected the credential. Returns false when there was
    /// nothing left to invalidate.
    pub(crate) fn invalidate(&self) -> bool {
        self.remove_persisted();
        let mut data = self.write();
        let had_credential = data.credential.take().is_some();
        data.identity = None;
        data.invalidated = had_credential;
        had_credential
    }

    /// Finish an invalidation: `Invalid` becomes `Anonymous`.
    pub(crate) fn settle(&self) {
        self.write().invalidated = false;
    }

    /// Drop credential and identity, in memory and on disk.
    pub(crate) fn clear(&self) {
        self.remove_persisted();
        let mut data = self.write();
        data.credential = None;
        data.identity = None;
        data.invalidated = false;
    }

    fn remove_persisted(&self) {
        if let Err(e) = self.storage.remove() {
            warn!(error = %e, "Failed to remove persisted credential");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.read();
        f.debug_struct("Session")
            .field("state", &data.state())
            .field("credential", &data.credential)
            .field("identity", &data.identity.as_ref().map(|i| i.id))
            .finish()
    }
}
