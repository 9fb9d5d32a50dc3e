//! HTTP handlers for barcode labels

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::error::{AppError, AppResult};
use crate::models::LabelKind;
use crate::services::label::PrintReport;
use crate::services::LabelService;
use crate::AppState;

fn parse_kind(kind: &str) -> AppResult<LabelKind> {
    LabelKind::parse(kind).ok_or_else(|| {
        AppError::validation("kind", format!("Unknown label kind '{}', use upc or unique", kind))
    })
}

/// Show the label image; never prints
pub async fn view_barcode(
    State(state): State<AppState>,
    Path((item_id, kind)): Path<(i64, String)>,
) -> AppResult<impl IntoResponse> {
    let kind = parse_kind(&kind)?;
    let service = LabelService::new(state.db, state.printer);
    let png = service.view_png(item_id, kind).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// Print the label and report the outcome
pub async fn print_barcode(
    State(state): State<AppState>,
    Path((item_id, kind)): Path<(i64, String)>,
) -> AppResult<Json<PrintReport>> {
    let kind = parse_kind(&kind)?;
    let service = LabelService::new(state.db, state.printer);
    Ok(Json(service.print(item_id, kind).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind("upc").unwrap(), LabelKind::Upc);
        assert_eq!(parse_kind("unique").unwrap(), LabelKind::Unique);
        assert!(matches!(
            parse_kind("qr"),
            Err(AppError::Validation { ref field, .. }) if field == "kind"
        ));
    }
}
