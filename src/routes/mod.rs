//! Route definitions for the stockdesk API.
//!
//! [`router`] is the single place the HTTP surface is declared: every path,
//! method, and handler pairing lives in this table, so the full API can be
//! read top to bottom without chasing per-module registration code.

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

pub mod auth;
pub mod customers;
pub mod employees;
pub mod goods_receipts;
pub mod health;
pub mod products;
pub mod storefront;
pub mod suppliers;
pub mod warehouses;

/// Build the application router. State and middleware layers are attached
/// by the caller.
pub fn router() -> Router<AppState> {
    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let employee_routes = Router::new()
        .route(
            "/employees",
            get(employees::list).post(employees::create),
        )
        .route(
            "/employees/{id}",
            get(employees::get_by_id)
                .put(employees::update)
                .delete(employees::delete),
        )
        .route("/employees/{id}/archive", post(employees::archive))
        .route("/employees/{id}/restore", post(employees::restore));

    let customer_routes = Router::new()
        .route(
            "/customers",
            get(customers::list).post(customers::create),
        )
        .route(
            "/customers/{id}",
            get(customers::get_by_id)
                .put(customers::update)
                .delete(customers::delete),
        )
        .route("/customers/{id}/archive", post(customers::archive))
        .route("/customers/{id}/restore", post(customers::restore));

    let supplier_routes = Router::new()
        .route(
            "/suppliers",
            get(suppliers::list).post(suppliers::create),
        )
        .route(
            "/suppliers/{id}",
            get(suppliers::get_by_id)
                .put(suppliers::update)
                .delete(suppliers::delete),
        )
        .route("/suppliers/{id}/archive", post(suppliers::archive))
        .route("/suppliers/{id}/restore", post(suppliers::restore));

    let warehouse_routes = Router::new()
        .route(
            "/warehouses",
            get(warehouses::list).post(warehouses::create),
        )
        .route(
            "/warehouses/{id}",
            get(warehouses::get_by_id)
                .put(warehouses::update)
                .delete(warehouses::delete),
        )
        .route("/warehouses/{id}/archive", post(warehouses::archive))
        .route("/warehouses/{id}/restore", post(warehouses::restore));

    let product_routes = Router::new()
        .route(
            "/products",
            get(products::list).post(products::create),
        )
        .route("/products/import", post(products::import))
        .route(
            "/products/{id}",
            get(products::get_by_id)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/products/{id}/archive", post(products::archive))
        .route("/products/{id}/restore", post(products::restore));

    let receipt_routes = Router::new()
        .route(
            "/goods-receipts",
            get(goods_receipts::list).post(goods_receipts::create),
        )
        .route(
            "/goods-receipts/{id}",
            get(goods_receipts::get_by_id)
                .put(goods_receipts::update)
                .delete(goods_receipts::delete),
        )
        .route("/goods-receipts/{id}/archive", post(goods_receipts::archive))
        .route("/goods-receipts/{id}/restore", post(goods_receipts::restore));

    let storefront_routes = Router::new()
        .route("/storefront/products", get(storefront::feed))
        .route("/storefront/products/{id}", get(storefront::get_by_id));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", auth_routes)
        .nest("/api/v1", employee_routes)
        .nest("/api/v1", customer_routes)
        .nest("/api/v1", supplier_routes)
        .nest("/api/v1", warehouse_routes)
        .nest("/api/v1", product_routes)
        .nest("/api/v1", receipt_routes)
        .nest("/api/v1", storefront_routes)
}
