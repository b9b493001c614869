use std::sync::Arc;

use bson::oid::ObjectId;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use super::event::Event;
use super::registry::ConnectionRegistry;

/// Best-effort, at-most-once push of events to live streams. No retry and
/// no queueing beyond the per-connection buffer; eventual visibility is
/// the durable store's job, not this path's.
#[derive(Clone)]
pub struct EventBroadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl EventBroadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Attempts delivery to `user_id`'s live stream and reports whether a
    /// write was handed to a connection. `false` with no listener is a
    /// routine outcome, never an error. A connection whose channel is
    /// closed (or wedged full) is evicted and counted as a miss.
    pub fn push(&self, user_id: &ObjectId, event: &Event) -> bool {
        let Some(connection) = self.registry.lookup(user_id) else {
            debug!(%user_id, "No live connection, push skipped");
            return false;
        };

        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(%user_id, %e, "Failed to serialize event");
                return false;
            }
        };

        match connection.sender.try_send(payload) {
            Ok(()) => {
                debug!(%user_id, "Event pushed");
                true
            }
            Err(TrySendError::Closed(_)) | Err(TrySendError::Full(_)) => {
                warn!(
                    %user_id,
                    connection_id = %connection.connection_id,
                    "Dead live connection evicted"
                );
                self.registry.unregister(user_id, &connection.connection_id);
                false
            }
        }
    }
}
