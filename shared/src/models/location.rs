//! Storage locations and their roles

use serde::{Deserialize, Serialize};

use super::ItemStatus;

/// What a location is used for; drives the status an item takes when moved there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationRole {
    Receiving,
    Dryer,
    Storage,
    Printer,
}

impl LocationRole {
    pub const ALL: [LocationRole; 4] = [
        LocationRole::Receiving,
        LocationRole::Dryer,
        LocationRole::Storage,
        LocationRole::Printer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LocationRole::Receiving => "receiving",
            LocationRole::Dryer => "dryer",
            LocationRole::Storage => "storage",
            LocationRole::Printer => "printer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "receiving" => Some(LocationRole::Receiving),
            "dryer" => Some(LocationRole::Dryer),
            "storage" => Some(LocationRole::Storage),
            "printer" => Some(LocationRole::Printer),
            _ => None,
        }
    }

    /// Status an item is expected to have while it sits at a location of this role
    pub fn implied_status(&self) -> ItemStatus {
        match self {
            LocationRole::Receiving => ItemStatus::New,
            LocationRole::Dryer => ItemStatus::Drying,
            LocationRole::Storage => ItemStatus::Stored,
            LocationRole::Printer => ItemStatus::InUse,
        }
    }
}

impl std::fmt::Display for LocationRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named physical place that can hold inventory items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub role: LocationRole,
}

impl Location {
    pub fn implied_status(&self) -> ItemStatus {
        self.role.implied_status()
    }
}
