use mongodb::Database;
use scholaris_config::Settings;
use scholaris_services::{
    AuthService, NotificationService,
    realtime::{ConnectionRegistry, EventBroadcaster},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub registry: Arc<ConnectionRegistry>,
    pub notifications: Arc<NotificationService>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = EventBroadcaster::new(registry.clone());
        let notifications = Arc::new(NotificationService::new(&db, broadcaster));

        Self {
            db,
            settings,
            auth,
            registry,
            notifications,
        }
    }
}
