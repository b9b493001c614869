use std::sync::{Arc, Mutex};

use chrono::Utc;
use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::api::{AgentError, ApiClient};
use crate::config::AgentConfig;
use crate::event::StreamEvent;
use crate::state::{AgentState, ConnectionStatus};

/// Client-side notification agent. Holds a live stream open with
/// automatic reconnect, reconciles on a fixed poll interval regardless of
/// stream state, and exposes the merged view as reactive state.
///
/// Pushed `action` events trigger a full re-fetch instead of being
/// applied directly — the durable store stays the single source of truth
/// and missed or out-of-order pushes cost nothing but latency.
pub struct NotificationAgent {
    config: AgentConfig,
    api: ApiClient,
    state_tx: watch::Sender<AgentState>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl NotificationAgent {
    pub fn new(config: AgentConfig) -> Arc<Self> {
        let api = ApiClient::new(&config);
        let (state_tx, _) = watch::channel(AgentState::default());
        Arc::new(Self {
            config,
            api,
            state_tx,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Spawns the stream and poll tasks after one initial reconciliation.
    /// Idempotent start is not supported; call once per agent.
    pub async fn start(self: &Arc<Self>) {
        if let Err(e) = self.reconcile().await {
            warn!(%e, "Initial reconciliation failed");
        }

        let stream = tokio::spawn(stream_loop(self.clone()));
        let poll = tokio::spawn(poll_loop(self.clone()));
        self.tasks.lock().unwrap().extend([stream, poll]);
    }

    /// Releases both timers/tasks. Dropping the stream task closes the
    /// socket, which releases the server-side registry entry.
    pub fn shutdown(&self) {
        for task in self.tasks.lock().unwrap().drain(..) {
            task.abort();
        }
        self.update(|s| s.status = ConnectionStatus::Disconnected);
        info!("Agent shut down");
    }

    /// Watch handle for reactive consumers (UI bindings, tests).
    pub fn subscribe(&self) -> watch::Receiver<AgentState> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AgentState {
        self.state_tx.borrow().clone()
    }

    /// Re-fetches the feed and unread count from the server, replacing
    /// whatever the agent held.
    pub async fn reconcile(&self) -> Result<(), AgentError> {
        let feed = self.api.fetch_feed(self.config.list_limit).await?;
        self.update(|s| {
            s.notifications = feed.items.clone();
            s.unread_count = feed.unread_count;
            s.last_sync = Some(Utc::now());
        });
        debug!(
            count = feed.items.len(),
            unread = feed.unread_count,
            "Reconciled"
        );
        Ok(())
    }

    // Imperative operations: optimistic local update first, then the API
    // call. No rollback on failure — the next reconciliation corrects
    // any drift.

    pub async fn mark_as_read(&self, notification_id: &str) -> Result<(), AgentError> {
        self.update(|s| {
            if let Some(n) = s
                .notifications
                .iter_mut()
                .find(|n| n.id == notification_id)
            {
                if !n.read {
                    n.read = true;
                    s.unread_count = s.unread_count.saturating_sub(1);
                }
            }
        });
        self.api.mark_read(notification_id).await?;
        Ok(())
    }

    pub async fn mark_all_as_read(&self) -> Result<(), AgentError> {
        self.update(|s| {
            for n in &mut s.notifications {
                n.read = true;
            }
            s.unread_count = 0;
        });
        self.api.mark_all_read().await?;
        Ok(())
    }

    pub async fn delete_notification(&self, notification_id: &str) -> Result<(), AgentError> {
        self.update(|s| {
            if let Some(pos) = s.notifications.iter().position(|n| n.id == notification_id) {
                let removed = s.notifications.remove(pos);
                if !removed.read {
                    s.unread_count = s.unread_count.saturating_sub(1);
                }
            }
        });
        self.api.delete(notification_id).await?;
        Ok(())
    }

    /// Emits an action: a durable action notification for `target_user_id`
    /// (or the agent's own user), pushed live by the server where
    /// possible. Reconciles right after so the local feed reflects it.
    pub async fn emit_action(
        &self,
        action_type: &str,
        title: &str,
        message: &str,
        metadata: serde_json::Value,
        target_user_id: Option<&str>,
    ) -> Result<(), AgentError> {
        self.api
            .create_action(action_type, title, message, metadata, target_user_id)
            .await?;
        self.reconcile().await
    }

    fn update(&self, f: impl FnOnce(&mut AgentState)) {
        self.state_tx.send_modify(f);
    }

    async fn handle_event(&self, text: &str) {
        match serde_json::from_str::<StreamEvent>(text) {
            Ok(StreamEvent::Connected { .. }) => {
                self.update(|s| s.status = ConnectionStatus::Connected);
                debug!("Live stream established");
            }
            Ok(StreamEvent::Heartbeat { unread_count }) => {
                self.update(|s| {
                    s.status = ConnectionStatus::Connected;
                    s.unread_count = unread_count;
                });
            }
            Ok(StreamEvent::Action { action_type, .. }) => {
                debug!(?action_type, "Action event, reconciling");
                if let Err(e) = self.reconcile().await {
                    warn!(%e, "Reconciliation after action event failed");
                }
            }
            Err(e) => debug!(%e, "Ignoring unparseable stream event"),
        }
    }
}

/// Stream lifecycle: connect, read until the stream dies, back off a
/// fixed delay, repeat. Never gives up — the poll loop keeps data fresh
/// while this retries.
async fn stream_loop(agent: Arc<NotificationAgent>) {
    loop {
        match connect_async(agent.config.stream_url()).await {
            Ok((socket, _response)) => {
                let (_write, mut read) = socket.split();
                while let Some(message) = read.next().await {
                    match message {
                        Ok(Message::Text(text)) => agent.handle_event(text.as_str()).await,
                        Ok(Message::Close(_)) => break,
                        Err(e) => {
                            warn!(%e, "Live stream error");
                            break;
                        }
                        _ => {}
                    }
                }
                info!("Live stream closed, reconnecting");
            }
            Err(e) => {
                debug!(%e, "Live stream connect failed");
            }
        }

        agent.update(|s| s.status = ConnectionStatus::Reconnecting);
        tokio::time::sleep(agent.config.reconnect_delay).await;
    }
}

/// Fallback poll: fixed cadence, independent of the stream. A failed
/// poll is logged and retried next tick; the agent keeps serving its
/// last-known state meanwhile.
async fn poll_loop(agent: Arc<NotificationAgent>) {
    let mut interval = tokio::time::interval(agent.config.poll_interval);
    interval.tick().await; // start() already reconciled once
    loop {
        interval.tick().await;
        if let Err(e) = agent.reconcile().await {
            debug!(%e, "Poll reconciliation failed");
        }
    }
}
