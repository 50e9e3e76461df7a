//! Client-side routing with an authentication guard.
//!
//! `Router::push` resolves a path against the `RouteTable`, runs the
//! `BeforeEach` guards, follows their redirects and commits the result to the
//! shared `History`.

pub mod guard;
pub mod history;
pub mod routes;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

pub use guard::{BeforeEach, GuardDecision, NavigationGuard};
pub use history::{History, Navigator};
pub use routes::{ResolvedRoute, RouteRecord, RouteTable, LOGIN_PATH};

/// Redirect chains longer than this are treated as a loop.
const MAX_REDIRECTS: usize = 5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("No route matches {0}")]
    NotFound(String),

    #[error("Too many redirects while navigating to {0}")]
    RedirectLoop(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The requested view was committed
    Rendered(ResolvedRoute),
    /// A guard sent the transition elsewhere; `to` was committed instead
    Redirected { from: String, to: ResolvedRoute },
    /// Another navigation (typically a logout redirect) happened while the
    /// guards were running; nothing was committed for this request
    Superseded { requested: String, current: Option<String> },
}

impl NavigationOutcome {
    /// The route that ended up on screen because of this transition, if any
    pub fn committed(&self) -> Option<&ResolvedRoute> {
        match self {
            NavigationOutcome::Rendered(route) => Some(route),
            NavigationOutcome::Redirected { to, .. } => Some(to),
            NavigationOutcome::Superseded { .. } => None,
        }
    }
}

pub struct Router {
    table: RouteTable,
    history: Arc<History>,
    guards: Vec<Arc<dyn BeforeEach>>,
}

impl Router {
    pub fn new(table: RouteTable, history: Arc<History>) -> Self {
        Self {
            table,
            history,
            guards: Vec::new(),
        }
    }

    /// Register a guard; guards run in registration order.
    pub fn before_each(mut self, guard: Arc<dyn BeforeEach>) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn history(&self) -> &Arc<History> {
        &self.history
    }

    pub fn current(&self) -> Option<String> {
        self.history.current()
    }

    pub async fn push(&self, path: &str) -> Result<NavigationOutcome, RouterError> {
        let mut target = path.to_string();
        let mut redirected = false;

        for _ in 0..=MAX_REDIRECTS {
            let route = self
                .table
                .resolve(&target)
                .ok_or_else(|| RouterError::NotFound(target.clone()))?;

            let before = self.history.len();
            let decision = self.run_guards(&route).await;
            if self.history.len() != before {
                let current = self.history.current();
                debug!(requested = path, ?current, "Navigation superseded");
                return Ok(NavigationOutcome::Superseded {
                    requested: path.to_string(),
                    current,
                });
            }

            match decision {
                GuardDecision::Proceed => {
                    self.history.commit(&route.full_path);
                    return Ok(if redirected {
                        NavigationOutcome::Redirected {
                            from: path.to_string(),
                            to: route,
                        }
                    } else {
                        NavigationOutcome::Rendered(route)
                    });
                }
                GuardDecision::Redirect(next) => {
                    debug!(from = %route.full_path, to = %next, "Guard redirect");
                    redirected = true;
                    target = next;
                }
            }
        }

        warn!(path, "Redirect loop");
        Err(RouterError::RedirectLoop(path.to_string()))
    }

    async fn run_guards(&self, route: &ResolvedRoute) -> GuardDecision {
        for guard in &self.guards {
            match guard.before_each(route).await {
                GuardDecision::Proceed => continue,
                redirect => return redirect,
            }
        }
        GuardDecision::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::{BoxFuture, FutureExt};

    struct AlwaysTo(&'static str);

    impl BeforeEach for AlwaysTo {
        fn before_each<'a>(&'a self, to: &'a ResolvedRoute) -> BoxFuture<'a, GuardDecision> {
            let decision = if to.path == self.0 {
                GuardDecision::Proceed
            } else {
                GuardDecision::Redirect(self.0.to_string())
            };
            async move { decision }.boxed()
        }
    }

    struct Bounce;

    impl BeforeEach for Bounce {
        fn before_each<'a>(&'a self, to: &'a ResolvedRoute) -> BoxFuture<'a, GuardDecision> {
            let next = if to.path == "/login" { "/test" } else { "/login" };
            async move { GuardDecision::Redirect(next.to_string()) }.boxed()
        }
    }

    struct NavigatesAway(Arc<History>);

    impl BeforeEach for NavigatesAway {
        fn before_each<'a>(&'a self, _to: &'a ResolvedRoute) -> BoxFuture<'a, GuardDecision> {
            async move {
                self.0.navigate("/login");
                GuardDecision::Proceed
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_push_without_guards_renders() {
        let router = Router::new(RouteTable::default(), Arc::new(History::new()));
        let outcome = router.push("/projects").await.expect("push");
        assert_eq!(outcome.committed().and_then(|r| r.name.as_deref()), Some("Projects"));
        assert_eq!(router.current().as_deref(), Some("/projects"));
    }

    #[tokio::test]
    async fn test_redirect_commits_only_target() {
        let history = Arc::new(History::new());
        let router = Router::new(RouteTable::default(), history.clone()).before_each(Arc::new(AlwaysTo("/login")));
        let outcome = router.push("/reports").await.expect("push");

        match outcome {
            NavigationOutcome::Redirected { from, to } => {
                assert_eq!(from, "/reports");
                assert_eq!(to.path, "/login");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(history.entries(), vec!["/login"]);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let router = Router::new(RouteTable::default(), Arc::new(History::new()));
        assert_eq!(router.push("/missing").await, Err(RouterError::NotFound("/missing".to_string())));
    }

    #[tokio::test]
    async fn test_redirect_loop_is_bounded() {
        let history = Arc::new(History::new());
        let router = Router::new(RouteTable::default(), history.clone()).before_each(Arc::new(Bounce));
        assert_eq!(router.push("/").await, Err(RouterError::RedirectLoop("/".to_string())));
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_navigation_during_guard_supersedes() {
        let history = Arc::new(History::new());
        let router =
            Router::new(RouteTable::default(), history.clone()).before_each(Arc::new(NavigatesAway(history.clone())));
        let outcome = router.push("/projects").await.expect("push");

        assert_eq!(
            outcome,
            NavigationOutcome::Superseded {
                requested: "/projects".to_string(),
                current: Some("/login".to_string()),
            }
        );
        assert_eq!(history.entries(), vec!["/login"]);
    }
}
