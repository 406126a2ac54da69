//! JSON over HTTP in front of [`Storefront`]. The client identity is taken
//! from the path as given.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::context::Storefront;

pub mod dto;
pub mod error;
mod handlers;

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub storefront: Storefront,
}

pub fn router(storefront: Storefront) -> Router {
    let state = AppState { storefront };
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/categories", get(handlers::list_categories))
        .route("/api/v1/products", get(handlers::list_products))
        .route("/api/v1/products/:id", get(handlers::get_product))
        .route(
            "/api/v1/clients/:client/cart",
            get(handlers::get_cart).post(handlers::add_to_cart).delete(handlers::clear_cart),
        )
        .route(
            "/api/v1/clients/:client/cart/:product",
            put(handlers::update_cart_item).delete(handlers::remove_cart_item),
        )
        .route("/api/v1/clients/:client/checkout", post(handlers::checkout))
        .route("/api/v1/clients/:client/orders", get(handlers::list_orders))
        .route("/api/v1/admin/clients", get(handlers::list_clients).post(handlers::create_client))
        .route("/api/v1/admin/clients/:id", delete(handlers::delete_client))
        .route("/api/v1/admin/categories", post(handlers::create_category))
        .route("/api/v1/admin/suppliers", post(handlers::create_supplier))
        .route("/api/v1/admin/products", post(handlers::create_product))
        .route("/api/v1/admin/products/:id", delete(handlers::delete_product))
        .route("/api/v1/admin/orders", get(handlers::list_all_orders))
        .route("/api/v1/admin/orders/:id", delete(handlers::delete_order))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
