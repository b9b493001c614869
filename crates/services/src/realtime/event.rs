use bson::Document;
use chrono::Utc;
use scholaris_db::models::{Notification, NotificationKind};
use serde::{Deserialize, Serialize};

/// One event on the live stream, serialized as a single JSON text frame:
/// `{"type": ..., ..., "timestamp": <RFC3339>}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Emitted once when a stream opens.
    Connected { message: String, timestamp: String },
    /// Periodic liveness signal carrying the current unread count.
    Heartbeat { unread_count: u64, timestamp: String },
    /// A notification arrived (or an ad-hoc action was emitted).
    Action {
        #[serde(skip_serializing_if = "Option::is_none")]
        notification_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        action_type: Option<String>,
        kind: NotificationKind,
        title: String,
        message: String,
        metadata: Document,
        timestamp: String,
    },
}

impl Event {
    pub fn connected() -> Self {
        Event::Connected {
            message: "Connected to the notification stream".to_string(),
            timestamp: now(),
        }
    }

    pub fn heartbeat(unread_count: u64) -> Self {
        Event::Heartbeat {
            unread_count,
            timestamp: now(),
        }
    }

    /// The push payload mirroring a stored notification. `action_type` is
    /// lifted out of the metadata bag when present.
    pub fn action_for(notification: &Notification) -> Self {
        Event::Action {
            notification_id: notification.id.map(|id| id.to_hex()),
            action_type: notification
                .metadata
                .get_str("action_type")
                .ok()
                .map(str::to_string),
            kind: notification.kind,
            title: notification.title.clone(),
            message: notification.body.clone(),
            metadata: notification.metadata.clone(),
            timestamp: now(),
        }
    }

    /// An action event with no durable record behind it (the push-only
    /// emit path).
    pub fn ad_hoc_action(
        action_type: &str,
        title: &str,
        message: &str,
        metadata: Document,
    ) -> Self {
        Event::Action {
            notification_id: None,
            action_type: Some(action_type.to_string()),
            kind: NotificationKind::Action,
            title: title.to_string(),
            message: message.to_string(),
            metadata,
            timestamp: now(),
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}
