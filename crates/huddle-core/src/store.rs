use crate::error::CoreError;
use async_trait::async_trait;
use huddle_api::types::{Message, MessageId, UserId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append(&self, message: Message) -> Result<(), CoreError>;
    async fn get(&self, id: MessageId) -> Result<Option<Message>, CoreError>;
    async fn find_pair(&self, a: &UserId, b: &UserId) -> Result<Vec<Message>, CoreError>;
    async fn mark_delivered(&self, id: MessageId, at_ms: u64) -> Result<(), CoreError>;
    async fn mark_read(&self, id: MessageId, at_ms: u64) -> Result<(), CoreError>;
}

#[derive(Clone, Default)]
pub struct InMemoryMessageStore {
    inner: Arc<Mutex<Vec<Message>>>,
    fail_next: Arc<AtomicBool>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_append(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, message: Message) -> Result<(), CoreError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(CoreError::Persistence("append".to_string()));
        }
        self.inner.lock().await.push(message);
        Ok(())
    }

    async fn get(&self, id: MessageId) -> Result<Option<Message>, CoreError> {
        let guard = self.inner.lock().await;
        Ok(guard.iter().find(|m| m.id == id).cloned())
    }

    async fn find_pair(&self, a: &UserId, b: &UserId) -> Result<Vec<Message>, CoreError> {
        let guard = self.inner.lock().await;
        Ok(guard
            .iter()
            .filter(|m| {
                (&m.from == a && &m.to == b) || (&m.from == b && &m.to == a)
            })
            .cloned()
            .collect())
    }

    async fn mark_delivered(&self, id: MessageId, at_ms: u64) -> Result<(), CoreError> {
        let mut guard = self.inner.lock().await;
        let message = guard
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(CoreError::NotFound)?;
        if message.delivered_at.is_none() {
            message.delivered_at = Some(at_ms);
        }
        Ok(())
    }

    async fn mark_read(&self, id: MessageId, at_ms: u64) -> Result<(), CoreError> {
        let mut guard = self.inner.lock().await;
        let message = guard
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(CoreError::NotFound)?;
        if message.read_at.is_none() {
            message.read_at = Some(at_ms);
        }
        Ok(())
    }
}
