//! Pre-render hook that keeps anonymous visitors out of protected views.

use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

use crate::auth::SessionStore;

use super::routes::{ResolvedRoute, LOGIN_PATH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(String),
}

/// Hook the router awaits before committing a transition.
pub trait BeforeEach: Send + Sync {
    fn before_each<'a>(&'a self, to: &'a ResolvedRoute) -> BoxFuture<'a, GuardDecision>;
}

/// Sole enforcement point for protected routes.
///
/// Rules, first match wins:
/// 1. protected target and no credential: redirect to `/login`
/// 2. credential but no identity yet: wait for the identity fetch, then proceed
/// 3. otherwise proceed
#[derive(Clone)]
pub struct NavigationGuard {
    store: SessionStore,
}

impl NavigationGuard {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    pub async fn check(&self, to: &ResolvedRoute) -> GuardDecision {
        let session = self.store.session();

        if to.requires_auth && !session.has_credential() {
            debug!(path = %to.path, "Protected route without credential");
            return GuardDecision::Redirect(LOGIN_PATH.to_string());
        }

        if session.has_credential() && !session.has_identity() {
            debug!(path = %to.path, "Resolving identity before navigation");
            if let Err(e) = self.store.fetch_identity().await {
                debug!(error = %e, "Identity fetch failed during navigation");
            }
        }

        GuardDecision::Proceed
    }
}

impl BeforeEach for NavigationGuard {
    fn before_each<'a>(&'a self, to: &'a ResolvedRoute) -> BoxFuture<'a, GuardDecision> {
        self.check(to).boxed()
    }
}
