//! Z report API
//!
//! Fiscal day-end reports generated from closed cash sessions. Reports
//! are immutable snapshots; the only mutation after generation is the
//! close that locks them.

pub mod handler;

use axum::{
    routing::{get, post},
    Router,
};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/z-reports", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/generate", post(handler::generate))
        .route("/summary", get(handler::summary))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/close", post(handler::close))
        .route("/{id}/print", get(handler::print))
}
