use super::{build_env, connect, drain, recv, text_request};
use crate::auth::InMemoryAuthenticator;
use crate::blob::InMemoryBlobStore;
use crate::config::CoreConfig;
use crate::directory::InMemoryDirectory;
use crate::error::CoreError;
use crate::store::{InMemoryMessageStore, MessageStore};
use crate::Core;
use huddle_api::events::{ClientEvent, ServerEvent};
use huddle_api::types::UserId;
use std::sync::Arc;

#[tokio::test]
async fn empty_recipient_is_rejected_without_persisting() {
    let env = build_env().await;
    let (amy, mut amy_rx) = connect(&env, "tok-amy").await;
    drain(&mut amy_rx);
    env.core
        .handle_client_event(amy, ClientEvent::SendMessage(text_request(" ", "hi")))
        .await;
    match recv(&mut amy_rx).await {
        ServerEvent::Error { message } => assert!(message.contains("toUserId")),
        other => panic!("expected error event, got {:?}", other),
    }
    assert!(env
        .store
        .find_pair(&UserId::new("amy"), &UserId::new(" "))
        .await
        .expect("history")
        .is_empty());
}

#[tokio::test]
async fn oversized_text_is_rejected() {
    let env = build_env().await;
    let (amy, mut amy_rx) = connect(&env, "tok-amy").await;
    drain(&mut amy_rx);
    let request = text_request("sue", &"x".repeat(65 * 1024));
    env.core
        .handle_client_event(amy, ClientEvent::SendMessage(request))
        .await;
    match recv(&mut amy_rx).await {
        ServerEvent::Error { message } => assert!(message.contains("text")),
        other => panic!("expected error event, got {:?}", other),
    }
}

#[tokio::test]
async fn operations_from_unknown_connection_fail() {
    let env = build_env().await;
    let ghost = uuid::Uuid::new_v4();
    let result = env.core.send_message(ghost, text_request("sue", "hi")).await;
    assert!(matches!(result, Err(CoreError::NotFound)));
    let result = env.core.load_history(ghost, UserId::new("sue")).await;
    assert!(matches!(result, Err(CoreError::NotFound)));
}

#[tokio::test]
async fn attachments_can_be_disabled_by_config() {
    let auth = Arc::new(InMemoryAuthenticator::new());
    auth.insert(
        "tok-amy",
        super::identity("amy", "Amy", huddle_api::types::Role::Staff),
    )
    .await;
    let core = Core::new(
        CoreConfig {
            allow_attachments: false,
            ..CoreConfig::default()
        },
        auth,
        Arc::new(InMemoryMessageStore::new()),
        Arc::new(InMemoryBlobStore::new()),
        Arc::new(InMemoryDirectory::new()),
    );
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let amy = core.connect("tok-amy", tx).await.expect("connect");
    drain(&mut rx);
    let mut request = text_request("sue", "with file");
    request.base64_data = Some("aGVsbG8=".to_string());
    let result = core.send_message(amy, request).await;
    assert!(matches!(result, Err(CoreError::Validation(_))));
}
