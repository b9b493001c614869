use std::time::Duration;

use axum::{
    extract::{Query, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    response::Response,
};
use bson::oid::ObjectId;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::AppState;
use scholaris_services::realtime::Event;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: String,
}

pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Response {
    // Verify JWT before accepting the WebSocket
    let claims = match state.auth.verify_access_token(&params.token) {
        Ok(c) => c,
        Err(_) => {
            return Response::builder()
                .status(401)
                .body("Unauthorized".into())
                .unwrap();
        }
    };

    let user_id = match ObjectId::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => {
            return Response::builder()
                .status(400)
                .body("Invalid user ID".into())
                .unwrap();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: ObjectId) {
    let connection_id = Uuid::new_v4().to_string();
    info!(%user_id, %connection_id, "Live stream connected");

    let (mut sink, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(state.settings.notifications.push_buffer);

    // Register before the first write so a concurrent notify already sees
    // this connection. Any prior connection of the same user is replaced.
    state
        .registry
        .register(user_id, connection_id.clone(), tx.clone());

    // Forward task: drain queued events into the socket. Ends when every
    // sender is gone (the registry replaced or closed this connection) or
    // the socket write fails.
    let forward = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sink.send(Message::text(payload)).await.is_err() {
                break;
            }
        }
    });

    // Stream opening: connected event, then the current unread count.
    if let Ok(payload) = serde_json::to_string(&Event::connected()) {
        let _ = tx.send(payload).await;
    }
    match state.notifications.count_unread(user_id).await {
        Ok(count) => {
            if let Ok(payload) = serde_json::to_string(&Event::heartbeat(count)) {
                let _ = tx.send(payload).await;
            }
        }
        Err(e) => warn!(%user_id, %e, "Initial unread count failed"),
    }
    // From here on the registry holds the only sender for this stream.
    drop(tx);

    // Heartbeat task: periodic unread-count refresh. Stops by itself once
    // this connection is no longer the user's current one or a push
    // misses.
    let hb_state = state.clone();
    let hb_connection_id = connection_id.clone();
    let heartbeat = tokio::spawn(async move {
        let period =
            Duration::from_secs(hb_state.settings.notifications.heartbeat_interval_secs.max(1));
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // immediate tick; the opening heartbeat covered it
        loop {
            interval.tick().await;
            if !hb_state.registry.is_current(&user_id, &hb_connection_id) {
                break;
            }
            match hb_state.notifications.count_unread(user_id).await {
                Ok(count) => {
                    if !hb_state
                        .notifications
                        .emit(&user_id, &Event::heartbeat(count))
                    {
                        break;
                    }
                }
                Err(e) => warn!(%user_id, %e, "Unread count query failed"),
            }
        }
    });

    // Read loop: the stream is server-to-client; pings are answered at the
    // protocol layer, so only close and error matter here.
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Close(_)) => break,
            Err(e) => {
                warn!(%user_id, %connection_id, %e, "Live stream error");
                break;
            }
            _ => {}
        }
    }

    // Cleanup on every exit path. The unregister is a no-op if a newer
    // connection already took over.
    state.registry.unregister(&user_id, &connection_id);
    heartbeat.abort();
    forward.abort();

    info!(%user_id, %connection_id, "Live stream disconnected");
}
