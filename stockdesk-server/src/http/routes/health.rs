//! Database connectivity check

use std::sync::Arc;

use axum::{extract::State, routing::get, Router};

use crate::http::server::AppState;

/// GET /check-db-connection
async fn check_db_connection(State(state): State<Arc<AppState>>) -> &'static str {
    if state.db.ping().await {
        "connected"
    } else {
        "unable to connect"
    }
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/check-db-connection", get(check_db_connection))
}
