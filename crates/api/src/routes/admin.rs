//! Operator routes mounted at `/admin`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// ```text
/// GET    /licencas                   -> list_licences
/// POST   /licencas                   -> issue_licence
/// GET    /licencas/{code}            -> get_licence
/// POST   /licencas/{code}/cancelar   -> cancel_licence
/// GET    /notificacoes               -> list_notifications
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/licencas",
            get(admin::list_licences).post(admin::issue_licence),
        )
        .route("/licencas/{code}", get(admin::get_licence))
        .route("/licencas/{code}/cancelar", post(admin::cancel_licence))
        .route("/notificacoes", get(admin::list_notifications))
}
