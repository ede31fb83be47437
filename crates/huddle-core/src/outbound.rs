use crate::session::ConnectionId;
use huddle_api::events::ServerEvent;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct OutboundRouter {
    inner: Arc<Mutex<HashMap<ConnectionId, UnboundedSender<ServerEvent>>>>,
}

impl OutboundRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn attach(&self, connection_id: ConnectionId, sender: UnboundedSender<ServerEvent>) {
        self.inner.lock().await.insert(connection_id, sender);
    }

    pub async fn detach(&self, connection_id: ConnectionId) {
        self.inner.lock().await.remove(&connection_id);
    }

    pub async fn push(&self, connection_id: ConnectionId, event: ServerEvent) {
        let guard = self.inner.lock().await;
        match guard.get(&connection_id) {
            Some(sender) => {
                if sender.send(event).is_err() {
                    log::debug!("dropping event for closed connection {}", connection_id);
                }
            }
            None => log::debug!("dropping event for unknown connection {}", connection_id),
        }
    }

    pub async fn push_all(&self, connection_ids: &[ConnectionId], event: ServerEvent) {
        let guard = self.inner.lock().await;
        for connection_id in connection_ids {
            if let Some(sender) = guard.get(connection_id) {
                let _ = sender.send(event.clone());
            }
        }
    }
}
