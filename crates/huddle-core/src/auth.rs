use crate::error::CoreError;
use async_trait::async_trait;
use huddle_api::types::Identity;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credential: &str) -> Result<Identity, CoreError>;
}

#[derive(Clone, Default)]
pub struct InMemoryAuthenticator {
    tokens: Arc<Mutex<HashMap<String, Identity>>>,
}

impl InMemoryAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, token: &str, identity: Identity) {
        self.tokens.lock().await.insert(token.to_string(), identity);
    }
}

#[async_trait]
impl Authenticator for InMemoryAuthenticator {
    async fn authenticate(&self, credential: &str) -> Result<Identity, CoreError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(CoreError::Auth("missing credential".to_string()));
        }
        self.tokens
            .lock()
            .await
            .get(credential)
            .cloned()
            .ok_or_else(|| CoreError::Auth("invalid credential".to_string()))
    }
}
