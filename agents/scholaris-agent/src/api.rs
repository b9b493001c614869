use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::AgentConfig;
use crate::state::ClientNotification;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
pub struct Feed {
    pub items: Vec<ClientNotification>,
    pub unread_count: u64,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Thin client for the notification pull API. Every call carries the
/// agent's bearer token; ownership is enforced server-side.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    pub async fn fetch_feed(&self, limit: i64) -> Result<Feed, AgentError> {
        let response = self
            .http
            .get(format!("{}/api/notification", self.base_url))
            .query(&[("limit", limit)])
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn mark_read(&self, notification_id: &str) -> Result<ClientNotification, AgentError> {
        let response = self
            .http
            .put(format!(
                "{}/api/notification/{}",
                self.base_url, notification_id
            ))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn mark_all_read(&self) -> Result<u64, AgentError> {
        #[derive(Deserialize)]
        struct Updated {
            updated_count: u64,
        }
        let response = self
            .http
            .put(format!("{}/api/notification", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::parse::<Updated>(response).await.map(|u| u.updated_count)
    }

    pub async fn delete(&self, notification_id: &str) -> Result<(), AgentError> {
        let response = self
            .http
            .delete(format!(
                "{}/api/notification/{}",
                self.base_url, notification_id
            ))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check(response).await
    }

    /// Creates a durable action notification (optionally for another
    /// user). The server pushes it live if a stream is open.
    pub async fn create_action(
        &self,
        action_type: &str,
        title: &str,
        message: &str,
        metadata: serde_json::Value,
        target_user_id: Option<&str>,
    ) -> Result<ClientNotification, AgentError> {
        let mut metadata = match metadata {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => serde_json::Map::new(),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        metadata.insert("action_type".to_string(), json!(action_type));

        let mut body = json!({
            "kind": "action",
            "title": title,
            "message": message,
            "metadata": metadata,
        });
        if let Some(target) = target_user_id {
            body["user_id"] = json!(target);
        }

        let response = self
            .http
            .post(format!("{}/api/notification", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn parse<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, AgentError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .map(|b| b.message)
                .unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }

    async fn check(response: reqwest::Response) -> Result<(), AgentError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .map(|b| b.message)
                .unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}
