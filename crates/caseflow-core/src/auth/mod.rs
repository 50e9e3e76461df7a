//! Authentication: the shared session, its durable credential, and the
//! store that drives login/logout.
//!
//! - `Session`: process-wide credential + identity state
//! - `SessionStore`: `login`, `fetch_identity`, `logout`
//! - `TokenStore`: durable credential storage (file, OS keychain, memory)

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::{Credential, FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};
pub use session::{Session, SessionState};
pub use store::{SessionStore, CURRENT_USER_ENDPOINT, LOGIN_ENDPOINT};
