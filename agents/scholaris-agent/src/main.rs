use clap::Parser;
use scholaris_agent::{AgentConfig, NotificationAgent};
use std::time::Duration;
use tracing::info;

/// Tails a user's notification stream: prints the feed on every change
/// until interrupted.
#[derive(Debug, Parser)]
#[command(name = "scholaris-agent")]
struct Args {
    /// API base URL.
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Access token for the user whose stream to follow.
    #[arg(long, env = "SCHOLARIS_TOKEN")]
    token: String,

    /// Reconciliation poll interval in seconds.
    #[arg(long, default_value_t = 10)]
    poll_interval_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scholaris_agent=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = AgentConfig::new(args.base_url, args.token);
    config.poll_interval = Duration::from_secs(args.poll_interval_secs.max(1));

    let agent = NotificationAgent::new(config);
    agent.start().await;

    let mut state_rx = agent.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                info!(
                    status = ?state.status,
                    unread = state.unread_count,
                    total = state.notifications.len(),
                    "Notification state"
                );
                if let Some(latest) = state.notifications.first() {
                    info!(kind = %latest.kind, title = %latest.title, "Latest notification");
                }
            }
        }
    }

    agent.shutdown();
    Ok(())
}
