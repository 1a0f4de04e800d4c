pub mod admin;
pub mod health;
pub mod licences;
pub mod pagbank;

use axum::Router;

use crate::state::AppState;

/// Build the full route tree.
///
/// ```text
/// /                                   liveness banner
/// /health                             service + database health
///
/// /licencas/validar                   validate a licence (POST, extension)
/// /pagbank/webhook                    payment notification (POST, PagBank)
///
/// /admin/licencas                     list, issue (admin)
/// /admin/licencas/{code}              fetch one (admin)
/// /admin/licencas/{code}/cancelar     cancel (POST, admin)
/// /admin/notificacoes                 recent payment notifications (admin)
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/licencas", licences::router())
        .nest("/pagbank", pagbank::router())
        .nest("/admin", admin::router())
}
