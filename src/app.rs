use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/live", get(handlers::get_live))
        .route("/api/analytics", get(handlers::get_analytics))
        .with_state(state)
}
