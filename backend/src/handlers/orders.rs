//! HTTP handlers for orders and shipments

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::services::order::{CreateOrderInput, OrderDetail, OrderSummary};
use crate::services::OrderService;
use crate::AppState;

pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<Vec<OrderSummary>>> {
    let service = OrderService::new(state.db);
    Ok(Json(service.list().await?))
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<(StatusCode, Json<OrderSummary>)> {
    let service = OrderService::new(state.db);
    let order = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let service = OrderService::new(state.db);
    Ok(Json(service.get(order_id).await?))
}

pub async fn add_order_item(
    State(state): State<AppState>,
    Path((order_id, item_id)): Path<(i64, i64)>,
) -> AppResult<Json<OrderDetail>> {
    let service = OrderService::new(state.db);
    Ok(Json(service.add_item(order_id, item_id).await?))
}

pub async fn remove_order_item(
    State(state): State<AppState>,
    Path((order_id, item_id)): Path<(i64, i64)>,
) -> AppResult<Json<OrderDetail>> {
    let service = OrderService::new(state.db);
    Ok(Json(service.remove_item(order_id, item_id).await?))
}
