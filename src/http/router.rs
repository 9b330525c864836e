use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/download", post(handlers::request_download))
        .route("/download/file", get(handlers::retrieve_file))
        .route("/verify", post(handlers::verify_purchase).get(handlers::lookup_purchase))
        .route("/orders", get(handlers::list_orders).post(handlers::create_order))
        .route("/products", post(handlers::register_product))
        .route("/products/:product_id", get(handlers::get_product))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
}
