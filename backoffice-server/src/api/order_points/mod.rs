//! Order point API
//!
//! The order lifecycle: open an order on a table, add and remove
//! products, fire lines to the kitchen, take payment.

pub mod handler;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/order-points", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route(
            "/{id}/products",
            put(handler::update_products).delete(handler::remove_products),
        )
        .route("/{id}/send-to-kitchen", post(handler::send_to_kitchen))
        .route("/{id}/process", post(handler::process))
}
