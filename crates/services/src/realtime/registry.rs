use bson::oid::ObjectId;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;

/// Outbound push handle for one live stream. Events travel as serialized
/// JSON strings; the socket task drains the receiving end.
#[derive(Debug, Clone)]
pub struct LiveConnection {
    pub connection_id: String,
    pub sender: mpsc::Sender<String>,
}

/// Tracks which users currently have a live stream open — at most one per
/// user. A new connection from the same user replaces the old one (last
/// connection wins). State is process-local and dies on restart; clients
/// reconnect and reconcile via pull.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ObjectId, LiveConnection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Stores a handle for `user_id`, replacing any prior one. Dropping
    /// the replaced sender closes its receiver, which shuts down the
    /// superseded socket task.
    pub fn register(
        &self,
        user_id: ObjectId,
        connection_id: impl Into<String>,
        sender: mpsc::Sender<String>,
    ) {
        let connection = LiveConnection {
            connection_id: connection_id.into(),
            sender,
        };
        if let Some(old) = self.connections.insert(user_id, connection) {
            debug!(%user_id, replaced = %old.connection_id, "Live connection replaced");
        }
    }

    /// Removes the entry only if it still belongs to `connection_id`, so a
    /// stale close arriving after a reconnect cannot evict the newer
    /// stream. Returns whether an entry was removed.
    pub fn unregister(&self, user_id: &ObjectId, connection_id: &str) -> bool {
        self.connections
            .remove_if(user_id, |_, conn| conn.connection_id == connection_id)
            .is_some()
    }

    pub fn lookup(&self, user_id: &ObjectId) -> Option<LiveConnection> {
        self.connections.get(user_id).map(|c| c.clone())
    }

    /// Whether `connection_id` is still the live handle for `user_id`.
    pub fn is_current(&self, user_id: &ObjectId, connection_id: &str) -> bool {
        self.connections
            .get(user_id)
            .map(|c| c.connection_id == connection_id)
            .unwrap_or(false)
    }

    pub fn connected_users(&self) -> Vec<ObjectId> {
        self.connections.iter().map(|r| *r.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Shutdown teardown: drop every handle so all socket tasks wind down.
    pub fn close_all(&self) {
        self.connections.clear();
    }
}
