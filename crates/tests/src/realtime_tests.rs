use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use crate::fixtures::test_app::TestApp;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn open_stream(app: &TestApp, token: &str) -> WsStream {
    let (ws, _) = connect_async(app.ws_url(token))
        .await
        .expect("Failed to open live stream");
    ws
}

/// Next text event from the stream, bounded by a 5 s timeout.
async fn next_event(ws: &mut WsStream) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("Timed out waiting for event")
            .expect("Stream ended")
            .expect("Stream error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("Invalid event JSON");
        }
    }
}

/// Every stream opens with `connected` followed by an unread-count
/// heartbeat; returns the heartbeat.
async fn drain_opening(ws: &mut WsStream) -> Value {
    let connected = next_event(ws).await;
    assert_eq!(connected["type"], "connected");
    let heartbeat = next_event(ws).await;
    assert_eq!(heartbeat["type"], "heartbeat");
    heartbeat
}

#[tokio::test]
async fn stream_opens_with_connected_then_heartbeat() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("streamer");

    let mut ws = open_stream(&app, &user.access_token).await;

    let connected = next_event(&mut ws).await;
    assert_eq!(connected["type"], "connected");
    assert!(connected["timestamp"].is_string());

    let heartbeat = next_event(&mut ws).await;
    assert_eq!(heartbeat["type"], "heartbeat");
    assert_eq!(heartbeat["unread_count"], 0);
}

#[tokio::test]
async fn stream_rejects_a_bad_token() {
    let app = TestApp::spawn().await;

    let result = connect_async(app.ws_url("not-a-valid-token")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn notify_pushes_an_action_event_to_the_live_stream() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("pushee");

    let mut ws = open_stream(&app, &user.access_token).await;
    drain_opening(&mut ws).await;

    let created: Value = app
        .auth_post("/api/notification", &user.access_token)
        .json(&serde_json::json!({
            "kind": "action",
            "title": "Doc uploaded",
            "message": "file.pdf uploaded",
            "metadata": { "action_type": "document_uploaded" },
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let event = next_event(&mut ws).await;
    assert_eq!(event["type"], "action");
    assert_eq!(event["action_type"], "document_uploaded");
    assert_eq!(event["title"], "Doc uploaded");
    assert_eq!(event["message"], "file.pdf uploaded");
    assert_eq!(event["notification_id"], created["id"]);

    // The push mirrors a record that was already durable.
    let feed: Value = app
        .auth_get("/api/notification", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(feed["items"][0]["id"], created["id"]);
}

#[tokio::test]
async fn last_connection_wins_and_stale_closes_do_not_evict() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("twotabs");

    let mut ws_a = open_stream(&app, &user.access_token).await;
    drain_opening(&mut ws_a).await;

    // Second tab: replaces the first connection.
    let mut ws_b = open_stream(&app, &user.access_token).await;
    drain_opening(&mut ws_b).await;

    app.auth_post("/api/notification", &user.access_token)
        .json(&serde_json::json!({
            "kind": "message",
            "title": "First",
            "message": "goes to the newest connection",
        }))
        .send()
        .await
        .unwrap();

    // Only the most recent connection receives the push.
    let event = next_event(&mut ws_b).await;
    assert_eq!(event["type"], "action");
    assert_eq!(event["title"], "First");

    let leftover = tokio::time::timeout(Duration::from_secs(1), ws_a.next()).await;
    assert!(leftover.is_err(), "superseded connection must stay silent");

    // Closing the superseded connection must not evict the newer one.
    drop(ws_a);
    tokio::time::sleep(Duration::from_millis(200)).await;

    app.auth_post("/api/notification", &user.access_token)
        .json(&serde_json::json!({
            "kind": "message",
            "title": "Second",
            "message": "still delivered after the stale close",
        }))
        .send()
        .await
        .unwrap();

    let event = next_event(&mut ws_b).await;
    assert_eq!(event["type"], "action");
    assert_eq!(event["title"], "Second");
}

#[tokio::test]
async fn emit_delivers_to_a_live_listener_without_persisting() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("adhoc");

    let mut ws = open_stream(&app, &user.access_token).await;
    drain_opening(&mut ws).await;

    let resp: Value = app
        .auth_post("/api/notification/emit", &user.access_token)
        .json(&serde_json::json!({
            "action_type": "project_updated",
            "title": "Project updated",
            "message": "The timeline changed",
            "metadata": { "project_title": "Coral genomics" },
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(resp["delivered"], true);

    let event = next_event(&mut ws).await;
    assert_eq!(event["type"], "action");
    assert_eq!(event["action_type"], "project_updated");
    assert_eq!(event["metadata"]["project_title"], "Coral genomics");
    assert!(event.get("notification_id").is_none());

    // Push-only: the feed stays empty.
    let feed: Value = app
        .auth_get("/api/notification", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(feed["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn heartbeats_refresh_the_unread_count() {
    let app = TestApp::spawn_with_settings(|s| {
        s.notifications.heartbeat_interval_secs = 1;
    })
    .await;
    let user = app.seed_user("pulse");

    let mut ws = open_stream(&app, &user.access_token).await;
    let opening = drain_opening(&mut ws).await;
    assert_eq!(opening["unread_count"], 0);

    app.auth_post("/api/notification", &user.access_token)
        .json(&serde_json::json!({
            "kind": "system",
            "title": "Unread",
            "message": "bump the count",
        }))
        .send()
        .await
        .unwrap();

    // The action event arrives first; within the next interval a
    // heartbeat reports the new count.
    loop {
        let event = next_event(&mut ws).await;
        if event["type"] == "heartbeat" {
            assert_eq!(event["unread_count"], 1);
            break;
        }
        assert_eq!(event["type"], "action");
    }
}

#[tokio::test]
async fn notifications_target_other_users_streams() {
    let app = TestApp::spawn().await;
    let sender = app.seed_user("sender");
    let recipient = app.seed_user("recipient");

    let mut ws = open_stream(&app, &recipient.access_token).await;
    drain_opening(&mut ws).await;

    // The sender notifies the recipient (the application-code entry
    // point: e.g. a collaboration invite).
    app.auth_post("/api/notification", &sender.access_token)
        .json(&serde_json::json!({
            "kind": "invitation",
            "title": "New collaboration invitation",
            "message": "sender invited you to \"Coral genomics\"",
            "user_id": recipient.id,
        }))
        .send()
        .await
        .unwrap();

    let event = next_event(&mut ws).await;
    assert_eq!(event["type"], "action");
    assert_eq!(event["kind"], "invitation");

    // Durable for the recipient, invisible to the sender.
    let feed: Value = app
        .auth_get("/api/notification", &recipient.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(feed["unread_count"], 1);

    let feed: Value = app
        .auth_get("/api/notification", &sender.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(feed["unread_count"], 0);
}
