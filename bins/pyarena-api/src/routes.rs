use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", get(handlers::health_check))
        .route("/challenges", get(handlers::list_challenges))
        .route("/challenges/:challenge_id/submit", post(handlers::submit))
}
