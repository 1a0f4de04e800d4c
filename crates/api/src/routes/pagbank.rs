use axum::routing::post;
use axum::Router;

use crate::handlers::pagbank;
use crate::state::AppState;

/// Payment provider callbacks mounted at `/pagbank`.
pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(pagbank::pagbank_webhook))
}
