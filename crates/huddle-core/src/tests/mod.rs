pub mod negative_tests;
pub mod presence_tests;

use crate::auth::InMemoryAuthenticator;
use crate::blob::InMemoryBlobStore;
use crate::config::CoreConfig;
use crate::directory::InMemoryDirectory;
use crate::session::ConnectionId;
use crate::store::InMemoryMessageStore;
use crate::Core;
use huddle_api::events::ServerEvent;
use huddle_api::types::{Identity, Role, SendMessageRequest, UserId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

pub const DEBOUNCE_MS: u64 = 50;

pub struct TestEnv {
    pub core: Core,
    pub auth: Arc<InMemoryAuthenticator>,
    pub store: Arc<InMemoryMessageStore>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub directory: Arc<InMemoryDirectory>,
}

pub async fn build_env() -> TestEnv {
    let auth = Arc::new(InMemoryAuthenticator::new());
    let store = Arc::new(InMemoryMessageStore::new());
    let blobs = Arc::new(InMemoryBlobStore::new());
    let directory = Arc::new(InMemoryDirectory::new());
    let config = CoreConfig {
        typing_debounce_ms: DEBOUNCE_MS,
        ..CoreConfig::default()
    };
    let core = Core::new(
        config,
        auth.clone(),
        store.clone(),
        blobs.clone(),
        directory.clone(),
    );
    auth.insert("tok-amy", identity("amy", "Amy", Role::Staff))
        .await;
    auth.insert("tok-bob", identity("bob", "Bob", Role::Staff))
        .await;
    auth.insert("tok-sue", identity("sue", "Sue", Role::Support))
        .await;
    TestEnv {
        core,
        auth,
        store,
        blobs,
        directory,
    }
}

pub fn identity(id: &str, name: &str, role: Role) -> Identity {
    Identity {
        user_id: UserId::new(id),
        display_name: name.to_string(),
        role,
    }
}

pub async fn connect(env: &TestEnv, token: &str) -> (ConnectionId, UnboundedReceiver<ServerEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = env.core.connect(token, tx).await.expect("connect");
    (connection_id, rx)
}

pub async fn recv(rx: &mut UnboundedReceiver<ServerEvent>) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

pub fn drain(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn text_request(to: &str, text: &str) -> SendMessageRequest {
    SendMessageRequest {
        to_user_id: UserId::new(to),
        text: Some(text.to_string()),
        attachment: None,
        file_name: None,
        file_type: None,
        base64_data: None,
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
    bytes
}
