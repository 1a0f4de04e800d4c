use std::sync::Arc;

use licensing_delivery::LicenceMailer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: licensing_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Licence e-mail sender (logs instead of sending when SMTP is unset).
    pub mailer: Arc<LicenceMailer>,
}
