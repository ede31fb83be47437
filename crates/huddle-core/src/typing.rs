use crate::outbound::OutboundRouter;
use crate::presence::PresenceRegistry;
use crate::session::ConnectionId;
use huddle_api::events::ServerEvent;
use huddle_api::types::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

enum TypingState {
    Typing,
    StopPending(JoinHandle<()>),
}

/// Debounced typing indicator fan-out. Stop signals are deliberately
/// delayed and cancellable so keystroke pauses do not flicker the peer UI.
#[derive(Clone)]
pub struct TypingCoordinator {
    entries: Arc<Mutex<HashMap<(ConnectionId, UserId), TypingState>>>,
    presence: Arc<PresenceRegistry>,
    outbound: OutboundRouter,
    debounce: Duration,
}

impl TypingCoordinator {
    pub fn new(
        presence: Arc<PresenceRegistry>,
        outbound: OutboundRouter,
        debounce: Duration,
    ) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            presence,
            outbound,
            debounce,
        }
    }

    pub async fn start(
        &self,
        connection_id: ConnectionId,
        from_user: UserId,
        from_name: String,
        to_user: UserId,
    ) {
        {
            let mut entries = self.entries.lock().await;
            let previous =
                entries.insert((connection_id, to_user.clone()), TypingState::Typing);
            if let Some(TypingState::StopPending(handle)) = previous {
                handle.abort();
            }
        }
        let peers = self.presence.live_connections(&to_user).await;
        self.outbound
            .push_all(
                &peers,
                ServerEvent::UserTyping {
                    from_user_id: from_user,
                    name: from_name,
                },
            )
            .await;
    }

    pub async fn stop(&self, connection_id: ConnectionId, from_user: UserId, to_user: UserId) {
        let key = (connection_id, to_user.clone());
        let mut entries = self.entries.lock().await;
        if let Some(TypingState::StopPending(handle)) = entries.remove(&key) {
            handle.abort();
        }
        let coordinator = self.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(coordinator.debounce).await;
            let mut entries = coordinator.entries.lock().await;
            let still_pending =
                matches!(entries.get(&task_key), Some(TypingState::StopPending(_)));
            if !still_pending {
                // A newer start won the race; the stop is discarded.
                return;
            }
            entries.remove(&task_key);
            drop(entries);
            let peers = coordinator.presence.live_connections(&task_key.1).await;
            coordinator
                .outbound
                .push_all(
                    &peers,
                    ServerEvent::UserStoppedTyping {
                        from_user_id: from_user,
                    },
                )
                .await;
        });
        entries.insert(key, TypingState::StopPending(handle));
    }

    pub async fn cancel_connection(&self, connection_id: ConnectionId) {
        let mut entries = self.entries.lock().await;
        entries.retain(|(conn, _), state| {
            if *conn != connection_id {
                return true;
            }
            if let TypingState::StopPending(handle) = state {
                handle.abort();
            }
            false
        });
    }
}
