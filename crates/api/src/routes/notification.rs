use axum::{Json, extract::{Path, Query, State}};
use bson::{Document, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};
use scholaris_db::models::{Notification, NotificationKind};
use scholaris_services::realtime::Event;

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    pub kind: Option<NotificationKind>,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub metadata: Document,
    /// Target user; defaults to the caller (self-notification).
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmitEventRequest {
    pub action_type: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub metadata: Document,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub user_id: String,
    pub kind: &'static str,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub metadata: Document,
    pub created_at: String,
    pub updated_at: String,
}

/// Bounded newest-first list plus the unread count, always re-queried.
pub async fn feed(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<FeedParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let max = state.settings.notifications.list_limit;
    let limit = params.limit.unwrap_or(max).clamp(1, max);

    let feed = state.notifications.feed(auth.user_id, limit).await?;

    let items: Vec<NotificationResponse> = feed.items.into_iter().map(to_response).collect();

    Ok(Json(serde_json::json!({
        "items": items,
        "unread_count": feed.unread_count,
    })))
}

/// The notify entry point: durable record first, then best-effort push.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateNotificationRequest>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let target = match body.user_id.as_deref() {
        Some(raw) => ObjectId::parse_str(raw)
            .map_err(|_| ApiError::BadRequest("Invalid user_id".to_string()))?,
        None => auth.user_id,
    };

    let notification = state
        .notifications
        .notify(
            target,
            body.kind.unwrap_or(NotificationKind::Action),
            &body.title,
            &body.message,
            body.metadata,
        )
        .await?;

    Ok(Json(to_response(notification)))
}

pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<String>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let nid = ObjectId::parse_str(&notification_id)
        .map_err(|_| ApiError::BadRequest("Invalid notification_id".to_string()))?;

    let notification = state.notifications.mark_read(auth.user_id, nid).await?;

    Ok(Json(to_response(notification)))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let updated = state.notifications.mark_all_read(auth.user_id).await?;

    Ok(Json(serde_json::json!({ "updated_count": updated })))
}

pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let nid = ObjectId::parse_str(&notification_id)
        .map_err(|_| ApiError::BadRequest("Invalid notification_id".to_string()))?;

    state.notifications.delete(auth.user_id, nid).await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Push-only action event, no durable record. `delivered: false` means the
/// target has no live stream right now — a routine outcome.
pub async fn emit(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<EmitEventRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let target = match body.user_id.as_deref() {
        Some(raw) => ObjectId::parse_str(raw)
            .map_err(|_| ApiError::BadRequest("Invalid user_id".to_string()))?,
        None => auth.user_id,
    };

    let event = Event::ad_hoc_action(&body.action_type, &body.title, &body.message, body.metadata);
    let delivered = state.notifications.emit(&target, &event);

    Ok(Json(serde_json::json!({ "delivered": delivered })))
}

fn to_response(n: Notification) -> NotificationResponse {
    NotificationResponse {
        id: n.id.map(|id| id.to_hex()).unwrap_or_default(),
        user_id: n.user_id.to_hex(),
        kind: n.kind.as_str(),
        title: n.title,
        message: n.body,
        read: n.read,
        metadata: n.metadata,
        created_at: n.created_at.try_to_rfc3339_string().unwrap_or_default(),
        updated_at: n.updated_at.try_to_rfc3339_string().unwrap_or_default(),
    }
}
