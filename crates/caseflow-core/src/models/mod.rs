//! Data models exchanged with the caseflow backend.
//!
//! - `Identity`, `Role`: the signed-in user's profile
//! - `LoginRequest`, `TokenResponse`: login endpoint bodies

pub mod auth;
pub mod identity;

pub use auth::{LoginRequest, TokenResponse};
pub use identity::{Identity, Role};
