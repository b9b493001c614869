pub mod agent;
pub mod api;
pub mod config;
pub mod event;
pub mod state;

pub use agent::NotificationAgent;
pub use api::AgentError;
pub use config::AgentConfig;
pub use state::{AgentState, ClientNotification, ConnectionStatus};
