use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Live-stream connectivity as the agent sees it. Polling continues in
/// every state, so a degraded stream never blocks the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Initial state, before the first stream attempt.
    Disconnected,
    /// Live stream open; events arrive as they happen.
    Connected,
    /// Stream lost; serving last-known data while retrying.
    Reconnecting,
}

/// Client-side view of one notification, as returned by the pull API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientNotification {
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: String,
    pub updated_at: String,
}

/// The agent's reactive state: last-known feed, unread count, stream
/// status, and when the feed was last reconciled with the server.
#[derive(Debug, Clone)]
pub struct AgentState {
    pub notifications: Vec<ClientNotification>,
    pub unread_count: u64,
    pub status: ConnectionStatus,
    pub last_sync: Option<DateTime<Utc>>,
}

impl Default for AgentState {
    fn default() -> Self {
        Self {
            notifications: Vec::new(),
            unread_count: 0,
            status: ConnectionStatus::Disconnected,
            last_sync: None,
        }
    }
}
