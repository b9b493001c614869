use std::time::Duration;

/// Agent configuration. The defaults match the server's expectations:
/// a 10 s reconciliation poll and a 5 s pause between reconnect attempts.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// API base URL, e.g. `http://127.0.0.1:3000`.
    pub base_url: String,
    /// Access token presented on both the pull API and the live stream.
    pub token: String,
    /// Fixed reconciliation interval; fires regardless of stream state.
    pub poll_interval: Duration,
    /// Pause between live-stream reconnect attempts.
    pub reconnect_delay: Duration,
    /// Feed size requested on reconciliation.
    pub list_limit: i64,
}

impl AgentConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            poll_interval: Duration::from_secs(10),
            reconnect_delay: Duration::from_secs(5),
            list_limit: 50,
        }
    }

    /// `ws(s)://.../ws?token=...` derived from the base URL.
    pub fn stream_url(&self) -> String {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        format!("{}/ws?token={}", ws_base.trim_end_matches('/'), self.token)
    }
}
