use bson::{Document, oid::ObjectId};
use mongodb::Database;
use scholaris_db::models::{Notification, NotificationKind};
use tracing::debug;

use crate::dao::base::DaoResult;
use crate::dao::notification::NotificationDao;
use crate::realtime::{Event, EventBroadcaster};

/// The orchestration seam application code uses to reach the notification
/// core. Persist-then-push: the durable write is the success criterion,
/// the live push is best-effort decoration.
pub struct NotificationService {
    dao: NotificationDao,
    broadcaster: EventBroadcaster,
}

/// A user's pull view: bounded newest-first list plus the unread count.
#[derive(Debug)]
pub struct NotificationFeed {
    pub items: Vec<Notification>,
    pub unread_count: u64,
}

impl NotificationService {
    pub fn new(db: &Database, broadcaster: EventBroadcaster) -> Self {
        Self {
            dao: NotificationDao::new(db),
            broadcaster,
        }
    }

    /// The sole write entry point. The record is durable before any push
    /// is attempted, and a missed push never fails the call — an offline
    /// user picks the notification up on their next reconciliation.
    pub async fn notify(
        &self,
        user_id: ObjectId,
        kind: NotificationKind,
        title: &str,
        body: &str,
        metadata: Document,
    ) -> DaoResult<Notification> {
        let notification = self.dao.create(user_id, kind, title, body, metadata).await?;

        let delivered = self
            .broadcaster
            .push(&user_id, &Event::action_for(&notification));
        debug!(%user_id, delivered, "Notification created");

        Ok(notification)
    }

    pub async fn feed(&self, user_id: ObjectId, limit: i64) -> DaoResult<NotificationFeed> {
        let items = self.dao.find_for_user(user_id, limit).await?;
        let unread_count = self.dao.count_unread(user_id).await?;
        Ok(NotificationFeed {
            items,
            unread_count,
        })
    }

    pub async fn count_unread(&self, user_id: ObjectId) -> DaoResult<u64> {
        self.dao.count_unread(user_id).await
    }

    pub async fn mark_read(
        &self,
        user_id: ObjectId,
        notification_id: ObjectId,
    ) -> DaoResult<Notification> {
        self.dao.mark_read(user_id, notification_id).await
    }

    pub async fn mark_all_read(&self, user_id: ObjectId) -> DaoResult<u64> {
        self.dao.mark_all_read(user_id).await
    }

    pub async fn delete(
        &self,
        user_id: ObjectId,
        notification_id: ObjectId,
    ) -> DaoResult<()> {
        self.dao.delete(user_id, notification_id).await
    }

    /// Push-only path: hands an event to the user's live stream without a
    /// durable record behind it. Reports whether delivery was attempted.
    pub fn emit(&self, user_id: &ObjectId, event: &Event) -> bool {
        self.broadcaster.push(user_id, event)
    }

    // Convenience shapes over `notify` for the notifications the
    // surrounding platform emits most. Pure data-shaping, no extra state.

    pub async fn notify_invitation(
        &self,
        user_id: ObjectId,
        sender_name: &str,
        project_title: &str,
        mut metadata: Document,
    ) -> DaoResult<Notification> {
        metadata.insert("sender_name", sender_name);
        metadata.insert("project_title", project_title);
        self.notify(
            user_id,
            NotificationKind::Invitation,
            "New collaboration invitation",
            &format!("{sender_name} invited you to collaborate on \"{project_title}\""),
            metadata,
        )
        .await
    }

    pub async fn notify_document_uploaded(
        &self,
        user_id: ObjectId,
        file_name: &str,
        project_title: &str,
        mut metadata: Document,
    ) -> DaoResult<Notification> {
        metadata.insert("file_name", file_name);
        metadata.insert("project_title", project_title);
        self.notify(
            user_id,
            NotificationKind::Document,
            "Document uploaded",
            &format!("{file_name} was uploaded to \"{project_title}\""),
            metadata,
        )
        .await
    }

    pub async fn notify_action(
        &self,
        user_id: ObjectId,
        action_type: &str,
        title: &str,
        body: &str,
        mut metadata: Document,
    ) -> DaoResult<Notification> {
        metadata.insert("action_type", action_type);
        self.notify(user_id, NotificationKind::Action, title, body, metadata)
            .await
    }
}
