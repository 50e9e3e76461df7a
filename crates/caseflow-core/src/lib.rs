//! Core of the caseflow client shell.
//!
//! - `auth`: shared session, durable credential, login/logout
//! - `api`: HTTP facade with credential and failure-handling stages
//! - `router`: route table, history and the authentication guard
//! - `notify`: user-visible messages raised by the HTTP facade
//! - `config`: persisted settings and environment overrides
//! - `context`: wires one session through all of the above

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod models;
pub mod notify;
pub mod router;

pub use api::{ApiClient, ApiError};
pub use auth::{Credential, Session, SessionState, SessionStore, TokenStore};
pub use config::Config;
pub use context::AppContext;
pub use models::{Identity, LoginRequest, Role};
pub use notify::{MessageLog, Notification, Notifier, TracingNotifier};
pub use router::{NavigationGuard, NavigationOutcome, Router, RouterError, LOGIN_PATH};
