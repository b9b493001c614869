pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod ws;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Notification routes (scoped to the authenticated caller)
    let notification_routes = Router::new()
        .route("/", get(routes::notification::feed))
        .route("/", post(routes::notification::create))
        .route("/", put(routes::notification::mark_all_read))
        .route("/emit", post(routes::notification::emit))
        .route("/{notification_id}", put(routes::notification::mark_read))
        .route("/{notification_id}", delete(routes::notification::remove));

    // Compose API
    let api = Router::new().nest("/notification", notification_routes);

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .route("/ws", get(ws::handler::ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
