//! Wiring of the application shell.
//!
//! `AppContext` owns the single `Session` and hands it to the HTTP pipeline,
//! the session store and the navigation guard.

use std::sync::Arc;

use anyhow::Result;

use crate::api::ApiClient;
use crate::auth::{Session, SessionStore, TokenStore};
use crate::config::Config;
use crate::notify::Notifier;
use crate::router::{History, NavigationGuard, RouteTable, Router};

pub struct AppContext {
    pub session: Arc<Session>,
    pub history: Arc<History>,
    pub api: ApiClient,
    pub store: SessionStore,
    pub router: Router,
}

impl AppContext {
    pub fn new(config: &Config, storage: Arc<dyn TokenStore>, notifier: Arc<dyn Notifier>) -> Result<Self> {
        Self::with_routes(config, storage, notifier, RouteTable::default())
    }

    pub fn with_routes(
        config: &Config,
        storage: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
        routes: RouteTable,
    ) -> Result<Self> {
        let session = Arc::new(Session::restore(storage));
        let history = Arc::new(History::new());

        let api = ApiClient::for_session(
            config.server_url.clone(),
            config.request_timeout(),
            session.clone(),
            history.clone(),
            notifier,
        )?;
        let store = SessionStore::new(session.clone(), api.clone(), history.clone());
        let router = Router::new(routes, history.clone()).before_each(Arc::new(NavigationGuard::new(store.clone())));

        Ok(Self {
            session,
            history,
            api,
            store,
            router,
        })
    }
}
