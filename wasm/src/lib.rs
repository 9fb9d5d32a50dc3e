//! WebAssembly module for the Filament Inventory service
//!
//! Provides client-side previews for:
//! - Status implied by a location role
//! - Location change confirmation, before the edit form is submitted
//! - Barcode label payloads
//! - Field validation

use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::lifecycle::*;
pub use shared::models::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {}

/// Status an item takes at a location of `role`, as its snake_case name
#[wasm_bindgen]
pub fn implied_status_for_role(role: &str) -> Option<String> {
    LocationRole::parse(role).map(|r| r.implied_status().as_str().to_string())
}

/// Preview of an edit's location change
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum Preview {
    Apply {
        location: Location,
        status: ItemStatus,
    },
    PendingConfirmation(PendingConfirmation),
}

fn preview(
    current_status: &str,
    current_location_json: &str,
    candidate_json: &str,
    acknowledged: bool,
) -> Result<String, String> {
    let status = ItemStatus::parse(current_status)
        .ok_or_else(|| format!("Unknown status '{}'", current_status))?;
    let current: Option<Location> = if current_location_json.trim().is_empty() {
        None
    } else {
        serde_json::from_str(current_location_json)
            .map_err(|e| format!("Invalid current location JSON: {}", e))?
    };
    let candidate: Location = serde_json::from_str(candidate_json)
        .map_err(|e| format!("Invalid location JSON: {}", e))?;

    let preview = match evaluate_location_change(status, current.as_ref(), candidate, acknowledged) {
        LocationChange::Apply { location, status } => Preview::Apply { location, status },
        LocationChange::Confirm(pending) => Preview::PendingConfirmation(pending),
    };
    serde_json::to_string(&preview).map_err(|e| e.to_string())
}

/// Evaluate a location change; returns a JSON object tagged by `outcome`
#[wasm_bindgen]
pub fn preview_location_change(
    current_status: &str,
    current_location_json: &str,
    candidate_json: &str,
    acknowledged: bool,
) -> Result<String, JsValue> {
    preview(current_status, current_location_json, candidate_json, acknowledged)
        .map_err(|e| JsValue::from_str(&e))
}

/// Barcode payload for an item; `kind` is "upc" or "unique"
#[wasm_bindgen]
pub fn barcode_payload(kind: &str, item_id: f64, product_upc: &str) -> Option<String> {
    if item_id.fract() != 0.0 || item_id < 1.0 {
        return None;
    }
    LabelKind::parse(kind).map(|k| label_payload(k, item_id as i64, product_upc))
}

/// Validate a `#RRGGBB` color code
#[wasm_bindgen]
pub fn is_valid_hex_code(hex: &str) -> bool {
    validate_hex_code(hex).is_ok()
}

/// Validate a UPC before it is submitted
#[wasm_bindgen]
pub fn is_valid_upc(upc: &str) -> bool {
    validate_upc(upc).is_ok()
}
