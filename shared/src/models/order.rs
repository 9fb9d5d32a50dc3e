//! Orders and shipments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An order grouping inventory items; with a tracking code it is a shipment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_num: String,
    pub tracking: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn is_shipment(&self) -> bool {
        self.tracking.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}
