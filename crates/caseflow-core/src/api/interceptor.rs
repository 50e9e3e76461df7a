//! Request/response stages of the HTTP pipeline.
//!
//! Stages are composed into an ordered list when the `ApiClient` is built.
//! Request stages may edit the outgoing request; response stages observe the
//! outcome and perform side effects, but can never swallow an error.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response};
use tracing::{debug, warn};

use crate::auth::Session;
use crate::notify::Notifier;
use crate::router::{Navigator, LOGIN_PATH};

use super::ApiError;

pub trait RequestStage: Send + Sync {
    fn name(&self) -> &'static str;

    fn on_request(&self, request: &mut Request) -> Result<(), ApiError>;
}

pub trait ResponseStage: Send + Sync {
    fn name(&self) -> &'static str;

    fn on_success(&self, _response: &Response) {}

    fn on_failure(&self, _error: &ApiError) {}
}

/// Adds `Authorization: Bearer <credential>` while the session holds a credential.
/// Requests without one go out unchanged.
pub struct AttachCredential {
    session: Arc<Session>,
}

impl AttachCredential {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }
}

impl RequestStage for AttachCredential {
    fn name(&self) -> &'static str {
        "attach-credential"
    }

    fn on_request(&self, request: &mut Request) -> Result<(), ApiError> {
        if let Some(credential) = self.session.credential() {
            let mut value = HeaderValue::from_str(&credential.bearer_header())
                .map_err(|_| ApiError::InvalidRequest("credential is not a valid header value".to_string()))?;
            value.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Ok(())
    }
}

/// Central failure handling: tell the user what went wrong, and on a 401
/// drop the session and send them to the login view.
pub struct HandleFailures {
    session: Arc<Session>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl HandleFailures {
    pub fn new(session: Arc<Session>, navigator: Arc<dyn Navigator>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            session,
            navigator,
            notifier,
        }
    }
}

impl ResponseStage for HandleFailures {
    fn name(&self) -> &'static str {
        "handle-failures"
    }

    fn on_failure(&self, error: &ApiError) {
        if let Some(notification) = error.notification() {
            self.notifier.notify(&notification);
        }
        if error.is_auth_expired() {
            let had_credential = self.session.invalidate();
            warn!(had_credential, "Credential rejected, redirecting to login");
            self.navigator.navigate(LOGIN_PATH);
            self.session.settle();
        }
    }
}

/// Debug-level trace of every exchange.
pub struct LogExchange;

impl RequestStage for LogExchange {
    fn name(&self) -> &'static str {
        "log-exchange"
    }

    fn on_request(&self, request: &mut Request) -> Result<(), ApiError> {
        debug!(method = %request.method(), url = %request.url(), "Sending request");
        Ok(())
    }
}

impl ResponseStage for LogExchange {
    fn name(&self) -> &'static str {
        "log-exchange"
    }

    fn on_success(&self, response: &Response) {
        debug!(status = %response.status(), url = %response.url(), "Request successful");
    }

    fn on_failure(&self, error: &ApiError) {
        debug!(error = %error, "Request failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Credential, MemoryTokenStore, SessionState, TokenStore};
    use crate::notify::{MessageLog, Notification};
    use crate::router::History;
    use reqwest::{Method, StatusCode, Url};

    fn request() -> Request {
        Request::new(Method::GET, Url::parse("http://localhost/api/v1/projects").expect("url"))
    }

    #[test]
    fn test_attach_credential_when_present() {
        let session = Arc::new(Session::restore(Arc::new(MemoryTokenStore::with_token("tok123"))));
        let mut req = request();
        AttachCredential::new(session).on_request(&mut req).expect("stage");
        assert_eq!(
            req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer tok123")
        );
    }

    #[test]
    fn test_no_header_without_credential() {
        let session = Arc::new(Session::restore(Arc::new(MemoryTokenStore::new())));
        let mut req = request();
        AttachCredential::new(session).on_request(&mut req).expect("stage");
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_unprintable_credential_is_rejected() {
        let session = Arc::new(Session::restore(Arc::new(MemoryTokenStore::new())));
        session.establish(Credential::new("bad\ntoken"));
        let mut req = request();
        let err = AttachCredential::new(session).on_request(&mut req).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    fn failure_stage(token: Option<&str>) -> (HandleFailures, Arc<Session>, Arc<MemoryTokenStore>, Arc<History>, Arc<MessageLog>) {
        let store = Arc::new(match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        });
        let session = Arc::new(Session::restore(store.clone()));
        let history = Arc::new(History::new());
        let log = Arc::new(MessageLog::new());
        let stage = HandleFailures::new(session.clone(), history.clone(), log.clone());
        (stage, session, store, history, log)
    }

    #[test]
    fn test_unauthorized_clears_session_and_redirects() {
        let (stage, session, store, history, log) = failure_stage(Some("tok123"));
        stage.on_failure(&ApiError::AuthenticationExpired);

        assert_eq!(log.messages(), vec![Notification::SessionExpired]);
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(store.load().expect("load"), None);
        assert_eq!(history.entries(), vec![LOGIN_PATH]);
    }

    #[test]
    fn test_server_error_leaves_session_alone() {
        let (stage, session, store, history, log) = failure_stage(Some("tok123"));
        stage.on_failure(&ApiError::RequestFailed {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: Some("db down".to_string()),
        });

        assert_eq!(log.messages()[0].message(), "db down");
        assert!(session.has_credential());
        assert_eq!(store.load().expect("load").as_deref(), Some("tok123"));
        assert!(history.is_empty());
    }
}
