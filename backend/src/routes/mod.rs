//! Route definitions for the Filament Inventory service

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create the authenticated inventory routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard/", get(handlers::get_dashboard))
        .merge(location_routes())
        .merge(product_routes())
        .merge(inventory_routes())
        .merge(label_routes())
        .merge(order_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Location registry
fn location_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/locations/",
            get(handlers::list_locations).post(handlers::create_location),
        )
        .route(
            "/locations/:location_id/",
            get(handlers::get_location)
                .put(handlers::update_location)
                .delete(handlers::delete_location),
        )
}

/// Product catalog
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/products/lookup/:code/", get(handlers::lookup_product))
        .route("/products/:product_id/", get(handlers::get_product))
}

/// Receiving, editing, search and export
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/addinventory/", post(handlers::receive_item))
        .route("/addinventory/defaults/", get(handlers::get_receive_defaults))
        .route("/search/", get(handlers::search_items))
        .route("/export/", get(handlers::export_items))
        .route(
            "/edit/:item_id/",
            get(handlers::get_item).post(handlers::edit_item),
        )
        .route("/barcode/:value/", get(handlers::resolve_barcode))
}

/// Barcode labels: GET views, POST prints
fn label_routes() -> Router<AppState> {
    Router::new().route(
        "/print_barcode/:item_id/:kind/",
        get(handlers::view_barcode).post(handlers::print_barcode),
    )
}

/// Orders and shipments
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders/", get(handlers::list_orders).post(handlers::create_order))
        .route("/orders/:order_id/", get(handlers::get_order))
        .route(
            "/orders/:order_id/items/:item_id/",
            post(handlers::add_order_item).delete(handlers::remove_order_item),
        )
}
