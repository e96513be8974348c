pub mod dto;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Scoring
        .route(
            "/api/v1/wallet/{wallet}/score",
            get(handlers::get_wallet_score),
        )
        // Name resolution (rate limited)
        .route("/api/v1/resolve", post(handlers::resolve_input))
}
