//! HTTP handlers for inventory items: receive, edit, search, export

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect},
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{parse_scanned_code, ScannedCode};
use crate::services::inventory::{
    EditItemInput, EditOutcome, ItemDetail, ItemListing, ReceiveDefaults, ReceiveItemInput,
    ReceiveOutcome, SearchQuery,
};
use crate::services::InventoryService;
use crate::AppState;

/// Receive one item by scanned UPC or SKU
pub async fn receive_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ReceiveItemInput>,
) -> AppResult<Json<ReceiveOutcome>> {
    let service = InventoryService::new(state.db);
    let outcome = service.receive(&current_user.0, input).await?;
    Ok(Json(outcome))
}

/// Prefill values for the next receive
pub async fn get_receive_defaults(State(state): State<AppState>) -> AppResult<Json<ReceiveDefaults>> {
    let service = InventoryService::new(state.db);
    Ok(Json(service.receive_defaults().await?))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> AppResult<Json<ItemDetail>> {
    let service = InventoryService::new(state.db);
    Ok(Json(service.detail(item_id).await?))
}

/// Edit an item; a withheld location change is returned as a 200 outcome
pub async fn edit_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Json(input): Json<EditItemInput>,
) -> AppResult<Json<EditOutcome>> {
    let service = InventoryService::new(state.db);
    Ok(Json(service.edit(item_id, input).await?))
}

pub async fn search_items(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<ItemListing>>> {
    let service = InventoryService::new(state.db);
    Ok(Json(service.search(&query).await?))
}

/// Download the filtered listing as CSV
pub async fn export_items(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<impl IntoResponse> {
    let service = InventoryService::new(state.db);
    let csv = service.export(&query).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"inventory_export.csv\"",
            ),
        ],
        csv,
    ))
}

/// Resolve a scanned barcode to the item or to a UPC search
pub async fn resolve_barcode(Path(value): Path<String>) -> Redirect {
    Redirect::to(&scanned_code_target(&value))
}

fn scanned_code_target(value: &str) -> String {
    match parse_scanned_code(value) {
        ScannedCode::Item(item_id) => format!("/edit/{}/", item_id),
        ScannedCode::Upc(upc) => {
            let encoded: String = url::form_urlencoded::byte_serialize(upc.as_bytes()).collect();
            format!("/search/?upc={}", encoded)
        },
    }
}
