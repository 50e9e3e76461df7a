//! HTTP client facade for the caseflow backend.
//!
//! All traffic to `/api/v1` goes through `ApiClient`. Its request stages
//! attach the session's bearer credential; its response stages turn failures
//! into user-visible notifications and drop the session on a 401.

pub mod client;
pub mod error;
pub mod interceptor;

pub use client::{ApiClient, ApiClientBuilder, API_PREFIX, REQUEST_TIMEOUT_SECS};
pub use error::ApiError;
pub use interceptor::{AttachCredential, HandleFailures, LogExchange, RequestStage, ResponseStage};
