use serde::Deserialize;

/// Client-side mirror of the server's live-stream events. Unknown fields
/// are ignored so the agent tolerates additive server changes.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Connected {
        #[serde(default)]
        message: String,
    },
    Heartbeat {
        unread_count: u64,
    },
    Action {
        #[serde(default)]
        action_type: Option<String>,
        title: String,
        message: String,
        #[serde(default)]
        metadata: serde_json::Value,
    },
}
