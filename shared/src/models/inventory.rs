//! Inventory item models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a physical inventory unit
///
/// Stored as the numeric codes 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    New,
    InUse,
    Drying,
    Stored,
    Depleted,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 5] = [
        ItemStatus::New,
        ItemStatus::InUse,
        ItemStatus::Drying,
        ItemStatus::Stored,
        ItemStatus::Depleted,
    ];

    pub fn code(&self) -> i16 {
        match self {
            ItemStatus::New => 1,
            ItemStatus::InUse => 2,
            ItemStatus::Drying => 3,
            ItemStatus::Stored => 4,
            ItemStatus::Depleted => 5,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(ItemStatus::New),
            2 => Some(ItemStatus::InUse),
            3 => Some(ItemStatus::Drying),
            4 => Some(ItemStatus::Stored),
            5 => Some(ItemStatus::Depleted),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::New => "new",
            ItemStatus::InUse => "in_use",
            ItemStatus::Drying => "drying",
            ItemStatus::Stored => "stored",
            ItemStatus::Depleted => "depleted",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            ItemStatus::New => "new",
            ItemStatus::InUse => "in use",
            ItemStatus::Drying => "drying",
            ItemStatus::Stored => "stored",
            ItemStatus::Depleted => "depleted",
        }
    }

    /// Accepts the snake_case name, the display label, or the numeric code
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i16>() {
            return Self::from_code(code);
        }
        let normalized = s.to_ascii_lowercase().replace(' ', "_");
        Self::ALL.into_iter().find(|status| status.as_str() == normalized)
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One physical unit of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: i64,
    pub product_id: i64,
    pub location_id: Option<i64>,
    pub user_id: Option<Uuid>,
    pub sku: Option<String>,
    pub shipment: Option<String>,
    pub serial_number: Option<String>,
    pub status: ItemStatus,
    pub date_added: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub date_depleted: Option<DateTime<Utc>>,
}

impl InventoryItem {
    /// Depleted items are kept for history but are not on hand
    pub fn is_active(&self) -> bool {
        self.status != ItemStatus::Depleted
    }

    /// Move to `status`, keeping `date_depleted` consistent with it
    pub fn apply_status(
        &mut self,
        status: ItemStatus,
        requested_depleted_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) {
        self.date_depleted = depletion_stamp(
            self.status,
            status,
            self.date_depleted,
            requested_depleted_at,
            now,
        );
        self.status = status;
        self.last_modified = now;
    }
}

/// Compute `date_depleted` for a status change.
///
/// Non-null exactly when `next` is DEPLETED. Entering DEPLETED stamps the
/// requested date or `now`; staying DEPLETED keeps the existing stamp unless
/// a new date is requested.
pub fn depletion_stamp(
    previous: ItemStatus,
    next: ItemStatus,
    current: Option<DateTime<Utc>>,
    requested: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if next != ItemStatus::Depleted {
        return None;
    }
    let kept = if previous == ItemStatus::Depleted {
        current
    } else {
        None
    };
    Some(requested.or(kept).unwrap_or(now))
}

/// Manual overrides that bypass the location rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    Deplete,
    Sell,
}
