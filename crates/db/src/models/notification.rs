use bson::{Document, oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// A durable per-user notification. Owned by exactly one user for its
/// lifetime; `read` only ever transitions false -> true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub read: bool,
    /// Open key/value bag (related entity ids, denormalized display
    /// fields, `action_type`). Stored and returned verbatim.
    #[serde(default)]
    pub metadata: Document,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Rendering tag for the client; the core never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Message,
    Invitation,
    System,
    Document,
    Action,
}

impl Notification {
    pub const COLLECTION: &'static str = "notifications";
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Message => "message",
            NotificationKind::Invitation => "invitation",
            NotificationKind::System => "system",
            NotificationKind::Document => "document",
            NotificationKind::Action => "action",
        }
    }
}
