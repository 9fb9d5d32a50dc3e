//! HTTP handlers for the product catalog

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::services::product::{CreateProductInput, ProductQuery, ProductView};
use crate::services::ProductService;
use crate::AppState;

/// List products, optionally filtered by `?kind=`
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<Vec<ProductView>>> {
    let service = ProductService::new(state.db);
    let products = service.list(&query).await?;
    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<(StatusCode, Json<ProductView>)> {
    let service = ProductService::new(state.db);
    let product = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> AppResult<Json<ProductView>> {
    let service = ProductService::new(state.db);
    Ok(Json(service.get(product_id).await?.into()))
}

/// Find a product by UPC, falling back to SKU
pub async fn lookup_product(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<ProductView>> {
    let service = ProductService::new(state.db);
    Ok(Json(service.lookup(&code).await?.into()))
}
