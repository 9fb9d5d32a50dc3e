//! Dashboard handler

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::dashboard::Dashboard;
use crate::services::DashboardService;
use crate::AppState;

/// Inventory totals and chart data
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Json<Dashboard>> {
    let service = DashboardService::new(state.db);
    Ok(Json(service.get().await?))
}
