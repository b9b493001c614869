use std::sync::Arc;

use scholaris_api::{build_router, state::AppState};
use scholaris_config::Settings;
use scholaris_db::{connect, indexes::ensure_indexes};
use scholaris_services::realtime::ConnectionRegistry;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "scholaris_api=debug,scholaris_services=debug,scholaris_db=debug,tower_http=debug"
                .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let settings = Settings::load()?;
    info!(
        "Starting Scholaris API on {}:{}",
        settings.app.host, settings.app.port
    );

    // Connect to MongoDB
    let db = connect(&settings).await?;

    // Ensure indexes
    ensure_indexes(&db).await?;

    // Build app state
    let app_state = AppState::new(db, settings.clone());
    let registry = app_state.registry.clone();

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(registry))
        .await?;

    Ok(())
}

/// Waits for Ctrl-C, then drops every live handle so socket tasks wind
/// down before the process exits.
async fn shutdown_signal(registry: Arc<ConnectionRegistry>) {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutting down, closing live connections");
    registry.close_all();
}
