//! Extension-facing licence routes mounted at `/licencas`.

use axum::routing::post;
use axum::Router;

use crate::handlers::licences;
use crate::state::AppState;

/// ```text
/// POST   /validar           -> validate_licence
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/validar", post(licences::validate_licence))
}
