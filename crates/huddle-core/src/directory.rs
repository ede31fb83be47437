use crate::error::CoreError;
use async_trait::async_trait;
use huddle_api::types::UserId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn touch_last_seen(&self, user_id: &UserId, at_ms: u64) -> Result<(), CoreError>;
}

#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    last_seen: Arc<Mutex<HashMap<UserId, u64>>>,
    fail: Arc<AtomicBool>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn last_seen(&self, user_id: &UserId) -> Option<u64> {
        self.last_seen.lock().await.get(user_id).copied()
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn touch_last_seen(&self, user_id: &UserId, at_ms: u64) -> Result<(), CoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CoreError::Persistence("last-seen".to_string()));
        }
        self.last_seen.lock().await.insert(user_id.clone(), at_ms);
        Ok(())
    }
}
