use crate::session::ConnectionId;
use huddle_api::types::{ActiveUser, UserId};
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

#[derive(Default)]
struct PresenceIndex {
    by_user: HashMap<UserId, HashSet<ConnectionId>>,
    by_connection: HashMap<ConnectionId, UserId>,
}

/// A user is online iff it has at least one live connection. Both sides of
/// the index are mutated under the same lock.
#[derive(Default)]
pub struct PresenceRegistry {
    inner: Mutex<PresenceIndex>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, user_id: &UserId, connection_id: ConnectionId) -> bool {
        let mut index = self.inner.lock().await;
        index
            .by_connection
            .insert(connection_id, user_id.clone());
        let connections = index.by_user.entry(user_id.clone()).or_default();
        connections.insert(connection_id);
        connections.len() == 1
    }

    pub async fn deregister(&self, connection_id: ConnectionId) -> Option<(UserId, bool)> {
        let mut index = self.inner.lock().await;
        let user_id = index.by_connection.remove(&connection_id)?;
        let last = match index.by_user.get_mut(&user_id) {
            Some(connections) => {
                connections.remove(&connection_id);
                connections.is_empty()
            }
            None => true,
        };
        if last {
            index.by_user.remove(&user_id);
        }
        Some((user_id, last))
    }

    pub async fn live_connections(&self, user_id: &UserId) -> Vec<ConnectionId> {
        let index = self.inner.lock().await;
        index
            .by_user
            .get(user_id)
            .map(|c| c.iter().copied().collect())
            .unwrap_or_default()
    }

    pub async fn is_online(&self, user_id: &UserId) -> bool {
        let index = self.inner.lock().await;
        index.by_user.contains_key(user_id)
    }

    pub async fn list_all(&self) -> Vec<ActiveUser> {
        let index = self.inner.lock().await;
        index
            .by_user
            .iter()
            .map(|(user_id, connections)| ActiveUser {
                user_id: user_id.clone(),
                connection_count: connections.len(),
            })
            .collect()
    }
}
