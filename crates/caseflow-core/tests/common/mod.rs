#![allow(dead_code)]

use std::sync::Arc;

use caseflow_core::auth::MemoryTokenStore;
use caseflow_core::{AppContext, Config, MessageLog};

pub const IDENTITY_JSON: &str = r#"{"id": 7, "email": "a@b.com", "full_name": "Ada Byron", "is_active": true, "is_superuser": false, "role": "tester"}"#;

pub struct Harness {
    pub ctx: AppContext,
    pub storage: Arc<MemoryTokenStore>,
    pub messages: Arc<MessageLog>,
}

pub fn harness(server_url: &str, token: Option<&str>) -> Harness {
    let storage = Arc::new(match token {
        Some(t) => MemoryTokenStore::with_token(t),
        None => MemoryTokenStore::new(),
    });
    let messages = Arc::new(MessageLog::new());
    let config = Config {
        server_url: server_url.to_string(),
        ..Config::default()
    };
    let ctx = AppContext::new(&config, storage.clone(), messages.clone()).expect("context");
    Harness { ctx, storage, messages }
}

/// Address nothing is listening on
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{}", addr)
}
