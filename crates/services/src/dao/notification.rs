use bson::{Document, doc, oid::ObjectId, DateTime};
use mongodb::Database;
use scholaris_db::models::{Notification, NotificationKind};

use super::base::{BaseDao, DaoError, DaoResult};

/// Durable per-user notification store. Every mutating operation scopes
/// its filter to the owning user, so a foreign notification id is
/// indistinguishable from a missing one.
pub struct NotificationDao {
    pub base: BaseDao<Notification>,
}

impl NotificationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Notification::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        user_id: ObjectId,
        kind: NotificationKind,
        title: &str,
        body: &str,
        metadata: Document,
    ) -> DaoResult<Notification> {
        let title = title.trim();
        let body = body.trim();
        if title.is_empty() {
            return Err(DaoError::Validation("title must not be empty".to_string()));
        }
        if body.is_empty() {
            return Err(DaoError::Validation("body must not be empty".to_string()));
        }

        let now = DateTime::now();
        let notification = Notification {
            id: None,
            user_id,
            kind,
            title: title.to_string(),
            body: body.to_string(),
            read: false,
            metadata,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&notification).await?;
        self.base.find_by_id(id).await
    }

    /// Newest first, bounded by `limit`. Re-queries on every call.
    pub async fn find_for_user(
        &self,
        user_id: ObjectId,
        limit: i64,
    ) -> DaoResult<Vec<Notification>> {
        self.base
            .find_many(
                doc! { "user_id": user_id },
                Some(doc! { "created_at": -1 }),
                Some(limit),
            )
            .await
    }

    pub async fn count_unread(&self, user_id: ObjectId) -> DaoResult<u64> {
        self.base
            .count(doc! { "user_id": user_id, "read": false })
            .await
    }

    /// Marks one owned notification read. Idempotent: only an unread
    /// record is updated, so a repeat call returns the record unchanged
    /// (`updated_at` included).
    pub async fn mark_read(
        &self,
        user_id: ObjectId,
        notification_id: ObjectId,
    ) -> DaoResult<Notification> {
        self.base
            .update_one(
                doc! { "_id": notification_id, "user_id": user_id, "read": false },
                doc! { "$set": { "read": true } },
            )
            .await?;

        self.base
            .find_one(doc! { "_id": notification_id, "user_id": user_id })
            .await?
            .ok_or(DaoError::NotFound)
    }

    /// Returns the number of records flipped to read.
    pub async fn mark_all_read(&self, user_id: ObjectId) -> DaoResult<u64> {
        self.base
            .update_many(
                doc! { "user_id": user_id, "read": false },
                doc! { "$set": { "read": true } },
            )
            .await
    }

    pub async fn delete(
        &self,
        user_id: ObjectId,
        notification_id: ObjectId,
    ) -> DaoResult<()> {
        let deleted = self
            .base
            .delete_one(doc! { "_id": notification_id, "user_id": user_id })
            .await?;
        if deleted { Ok(()) } else { Err(DaoError::NotFound) }
    }
}
