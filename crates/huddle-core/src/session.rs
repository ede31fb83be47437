use huddle_api::types::{Role, UserId};
use std::collections::HashMap;
use uuid::Uuid;

pub type ConnectionId = Uuid;

#[derive(Clone, Debug)]
pub struct ConnectionSession {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub display_name: String,
    pub role: Role,
    pub connected_at: u64,
}

#[derive(Default)]
pub struct SessionTable {
    inner: HashMap<ConnectionId, ConnectionSession>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, session: ConnectionSession) {
        self.inner.insert(session.connection_id, session);
    }

    pub fn remove(&mut self, connection_id: ConnectionId) -> Option<ConnectionSession> {
        self.inner.remove(&connection_id)
    }

    pub fn get(&self, connection_id: ConnectionId) -> Option<&ConnectionSession> {
        self.inner.get(&connection_id)
    }

    pub fn connections_with_role(&self, role: Role) -> Vec<ConnectionId> {
        self.inner
            .values()
            .filter(|s| s.role == role)
            .map(|s| s.connection_id)
            .collect()
    }
}
