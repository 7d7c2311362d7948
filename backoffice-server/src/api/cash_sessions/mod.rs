//! Cash session API
//!
//! Opening and closing drawer sessions on a point of sale, plus
//! history queries and reconciliation summaries.

pub mod handler;

use axum::{
    routing::{get, post},
    Router,
};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/cash-sessions", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/active", get(handler::get_active))
        .route("/summary", get(handler::summary))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/close", post(handler::close))
}
