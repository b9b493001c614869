pub mod auth;
pub mod dao;
pub mod notifications;
pub mod realtime;

pub use auth::AuthService;
pub use dao::*;
pub use notifications::NotificationService;
