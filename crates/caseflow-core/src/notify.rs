//! User-visible notifications raised by the HTTP pipeline.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::warn;

/// Fallback text when the server sends no usable detail
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired, please login again";

pub const NETWORK_ERROR_MESSAGE: &str = "Network error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    SessionExpired,
    RequestFailed { detail: Option<String> },
    NetworkError,
}

impl Notification {
    pub fn message(&self) -> &str {
        match self {
            Notification::SessionExpired => SESSION_EXPIRED_MESSAGE,
            Notification::RequestFailed { detail: Some(detail) } if !detail.is_empty() => detail.as_str(),
            Notification::RequestFailed { .. } => GENERIC_ERROR_MESSAGE,
            Notification::NetworkError => NETWORK_ERROR_MESSAGE,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Message-display capability. Called synchronously from the response pipeline,
/// so implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        warn!(kind = ?notification, "{}", notification.message());
    }
}

/// Keeps notifications in arrival order until drained.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Mutex<Vec<Notification>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything received so far
    pub fn messages(&self) -> Vec<Notification> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
    }
}

impl Notifier for MessageLog {
    fn notify(&self, notification: &Notification) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
    }
}
