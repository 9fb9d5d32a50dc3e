//! Status rules for moving inventory items between locations
//!
//! A location implies a status (see [`LocationRole::implied_status`]). Moving an
//! item that has already left NEW to a location implying a different status
//! is withheld until the user acknowledges the change.

use serde::{Deserialize, Serialize};

use crate::models::{ItemStatus, Location};

/// Severity of a pending-confirmation warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningLevel {
    Warning,
    /// The item is depleted; moving it brings it back into inventory
    Danger,
}

/// A location change computed but not applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    pub message: String,
    pub level: WarningLevel,
    pub location: Location,
    pub current_status: ItemStatus,
    pub implied_status: ItemStatus,
}

/// Result of evaluating a location change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationChange {
    Apply {
        location: Location,
        status: ItemStatus,
    },
    Confirm(PendingConfirmation),
}

impl LocationChange {
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, LocationChange::Confirm(_))
    }
}

/// Decide whether moving an item to `candidate` may proceed.
pub fn evaluate_location_change(
    current_status: ItemStatus,
    current_location: Option<&Location>,
    candidate: Location,
    acknowledged: bool,
) -> LocationChange {
    let implied = candidate.implied_status();

    if acknowledged || implied == current_status || current_status == ItemStatus::New {
        return LocationChange::Apply {
            location: candidate,
            status: implied,
        };
    }

    let level = if current_status == ItemStatus::Depleted {
        WarningLevel::Danger
    } else {
        WarningLevel::Warning
    };

    let message = match current_location {
        Some(from) => format!(
            "Moving this item from '{}' to '{}' changes its status from {} to {}. Submit again with acknowledgement to confirm.",
            from.name, candidate.name, current_status, implied
        ),
        None => format!(
            "Moving this item to '{}' changes its status from {} to {}. Submit again with acknowledgement to confirm.",
            candidate.name, current_status, implied
        ),
    };

    LocationChange::Confirm(PendingConfirmation {
        message,
        level,
        location: candidate,
        current_status,
        implied_status: implied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LocationRole;

    fn location(id: i64, name: &str, role: LocationRole) -> Location {
        Location {
            id,
            name: name.to_string(),
            role,
        }
    }

    #[test]
    fn test_new_item_moves_without_confirmation() {
        let change = evaluate_location_change(
            ItemStatus::New,
            None,
            location(3, "Dry Storage", LocationRole::Storage),
            false,
        );
        assert_eq!(
            change,
            LocationChange::Apply {
                location: location(3, "Dry Storage", LocationRole::Storage),
                status: ItemStatus::Stored,
            }
        );
    }

    #[test]
    fn test_conflicting_move_is_held() {
        let laser = location(9, "H2Laser", LocationRole::Printer);
        let change = evaluate_location_change(
            ItemStatus::InUse,
            Some(&laser),
            location(3, "Dry Storage", LocationRole::Storage),
            false,
        );
        match change {
            LocationChange::Confirm(pending) => {
                assert_eq!(pending.level, WarningLevel::Warning);
                assert_eq!(pending.location.name, "Dry Storage");
                assert_eq!(pending.implied_status, ItemStatus::Stored);
                assert!(pending.message.contains("'H2Laser'"));
                assert!(pending.message.contains("from in use to stored"));
            }
            other => panic!("expected confirmation, got {:?}", other),
        }
    }

    #[test]
    fn test_acknowledged_move_applies() {
        let laser = location(9, "H2Laser", LocationRole::Printer);
        let change = evaluate_location_change(
            ItemStatus::InUse,
            Some(&laser),
            location(3, "Dry Storage", LocationRole::Storage),
            true,
        );
        assert_eq!(
            change,
            LocationChange::Apply {
                location: location(3, "Dry Storage", LocationRole::Storage),
                status: ItemStatus::Stored,
            }
        );
    }

    #[test]
    fn test_matching_status_applies() {
        let change = evaluate_location_change(
            ItemStatus::Drying,
            Some(&location(2, "Dryer A", LocationRole::Dryer)),
            location(4, "Dryer B", LocationRole::Dryer),
            false,
        );
        assert!(!change.needs_confirmation());
    }

    #[test]
    fn test_reviving_depleted_item_is_danger() {
        let change = evaluate_location_change(
            ItemStatus::Depleted,
            None,
            location(1, "Receiving", LocationRole::Receiving),
            false,
        );
        match change {
            LocationChange::Confirm(pending) => assert_eq!(pending.level, WarningLevel::Danger),
            other => panic!("expected confirmation, got {:?}", other),
        }
    }
}
