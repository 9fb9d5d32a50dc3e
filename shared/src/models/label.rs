//! Barcode label kinds and payloads

use serde::{Deserialize, Serialize};

/// Prefix of per-item barcode payloads
pub const UNIQUE_PAYLOAD_PREFIX: &str = "INV-";

/// Which code a label carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    /// The product UPC, shared by every unit of the product
    Upc,
    /// A per-item identifier
    Unique,
}

impl LabelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelKind::Upc => "upc",
            LabelKind::Unique => "unique",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "upc" => Some(LabelKind::Upc),
            "unique" => Some(LabelKind::Unique),
            _ => None,
        }
    }
}

impl std::fmt::Display for LabelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text encoded into the barcode for an item
pub fn label_payload(kind: LabelKind, item_id: i64, product_upc: &str) -> String {
    match kind {
        LabelKind::Upc => product_upc.to_string(),
        LabelKind::Unique => unique_item_code(item_id),
    }
}

pub fn unique_item_code(item_id: i64) -> String {
    format!("{}{}", UNIQUE_PAYLOAD_PREFIX, item_id)
}

/// What a scanned barcode refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannedCode {
    Item(i64),
    Upc(String),
}

/// Resolve a scanned value: `INV-<id>` is an item, anything else a product UPC
pub fn parse_scanned_code(value: &str) -> ScannedCode {
    let value = value.trim();
    value
        .strip_prefix(UNIQUE_PAYLOAD_PREFIX)
        .and_then(|id| id.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .map(ScannedCode::Item)
        .unwrap_or_else(|| ScannedCode::Upc(value.to_string()))
}
