//! Status/location lifecycle tests
//!
//! Covers:
//! - NEW items move freely and take the location's implied status
//! - Progressed items need acknowledgement for a status-changing move
//! - Acknowledged moves always apply
//! - Depleting always stamps date_depleted

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use shared::{
    depletion_stamp, evaluate_location_change, InventoryItem, ItemStatus, Location, LocationChange,
    LocationRole, WarningLevel,
};

fn location(id: i64, name: &str, role: LocationRole) -> Location {
    Location {
        id,
        name: name.to_string(),
        role,
    }
}

fn item(status: ItemStatus, location_id: Option<i64>) -> InventoryItem {
    let added = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    InventoryItem {
        id: 232,
        product_id: 1,
        location_id,
        user_id: None,
        sku: None,
        shipment: None,
        serial_number: None,
        status,
        date_added: added,
        last_modified: added,
        date_depleted: (status == ItemStatus::Depleted).then_some(added),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// In-use item on a printer moved to dry storage, then acknowledged
    #[test]
    fn test_printer_to_dry_storage_scenario() {
        let h2laser = location(7, "H2Laser", LocationRole::Printer);
        let dry_storage = location(3, "Dry Storage", LocationRole::Storage);
        let current = item(ItemStatus::InUse, Some(h2laser.id));

        let first = evaluate_location_change(
            current.status,
            Some(&h2laser),
            dry_storage.clone(),
            false,
        );
        match &first {
            LocationChange::Confirm(pending) => {
                assert_eq!(pending.location, dry_storage);
                assert_eq!(pending.level, WarningLevel::Warning);
                assert_eq!(pending.current_status, ItemStatus::InUse);
                assert_eq!(pending.implied_status, ItemStatus::Stored);
                assert!(pending.message.contains("H2Laser"));
                assert!(pending.message.contains("Dry Storage"));
            }
            other => panic!("expected confirmation, got {:?}", other),
        }
        // Nothing was applied to the item
        assert_eq!(current.status, ItemStatus::InUse);
        assert_eq!(current.location_id, Some(7));

        let second = evaluate_location_change(current.status, Some(&h2laser), dry_storage.clone(), true);
        assert_eq!(
            second,
            LocationChange::Apply {
                location: dry_storage,
                status: ItemStatus::Stored,
            }
        );
    }

    #[test]
    fn test_depleted_item_move_is_danger() {
        let dryers = location(2, "Dryers", LocationRole::Dryer);
        match evaluate_location_change(ItemStatus::Depleted, None, dryers, false) {
            LocationChange::Confirm(pending) => assert_eq!(pending.level, WarningLevel::Danger),
            other => panic!("expected confirmation, got {:?}", other),
        }
    }

    #[test]
    fn test_leaving_depleted_clears_stamp() {
        let mut depleted = item(ItemStatus::Depleted, None);
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap();
        depleted.apply_status(ItemStatus::Stored, None, now);
        assert_eq!(depleted.date_depleted, None);
        assert_eq!(depleted.last_modified, now);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn status_strategy() -> impl Strategy<Value = ItemStatus> {
        prop::sample::select(ItemStatus::ALL.to_vec())
    }

    fn role_strategy() -> impl Strategy<Value = LocationRole> {
        prop::sample::select(LocationRole::ALL.to_vec())
    }

    fn location_strategy() -> impl Strategy<Value = Location> {
        (1i64..1000, "[A-Za-z ]{1,20}", role_strategy())
            .prop_map(|(id, name, role)| Location { id, name, role })
    }

    fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
        (1_600_000_000i64..1_900_000_000i64)
            .prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// NEW items always move without confirmation
        #[test]
        fn prop_new_items_move_freely(candidate in location_strategy(), acknowledged in any::<bool>()) {
            let implied = candidate.implied_status();
            match evaluate_location_change(ItemStatus::New, None, candidate.clone(), acknowledged) {
                LocationChange::Apply { location, status } => {
                    prop_assert_eq!(location, candidate);
                    prop_assert_eq!(status, implied);
                }
                LocationChange::Confirm(_) => prop_assert!(false, "NEW item needed confirmation"),
            }
        }

        /// A status-changing move of a progressed item is withheld
        #[test]
        fn prop_progressed_items_need_confirmation(
            status in status_strategy(),
            candidate in location_strategy(),
        ) {
            prop_assume!(status != ItemStatus::New);
            prop_assume!(candidate.implied_status() != status);

            let change = evaluate_location_change(status, None, candidate.clone(), false);
            match change {
                LocationChange::Confirm(pending) => {
                    prop_assert_eq!(pending.location, candidate);
                    prop_assert_eq!(pending.current_status, status);
                }
                LocationChange::Apply { .. } => prop_assert!(false, "change applied without acknowledgement"),
            }
        }

        /// A move to a location implying the current status never asks
        #[test]
        fn prop_matching_status_applies(candidate in location_strategy()) {
            let status = candidate.implied_status();
            prop_assert!(!evaluate_location_change(status, None, candidate, false).needs_confirmation());
        }

        /// Acknowledged moves always apply the candidate and its implied status
        #[test]
        fn prop_acknowledged_always_applies(
            status in status_strategy(),
            candidate in location_strategy(),
        ) {
            let implied = candidate.implied_status();
            let change = evaluate_location_change(status, None, candidate.clone(), true);
            prop_assert_eq!(change, LocationChange::Apply { location: candidate, status: implied });
        }

        /// Depleting stamps a date; any other status clears it
        #[test]
        fn prop_depletion_stamp_matches_status(
            previous in status_strategy(),
            next in status_strategy(),
            requested in prop::option::of(timestamp_strategy()),
            now in timestamp_strategy(),
        ) {
            let mut unit = item(previous, Some(1));
            unit.apply_status(next, requested, now);
            prop_assert_eq!(unit.status, next);
            prop_assert_eq!(unit.date_depleted.is_some(), next == ItemStatus::Depleted);
            prop_assert_eq!(unit.location_id, Some(1));
        }

        /// Entering DEPLETED uses the requested date, else now
        #[test]
        fn prop_entering_depleted_stamp(
            previous in status_strategy(),
            requested in prop::option::of(timestamp_strategy()),
            now in timestamp_strategy(),
        ) {
            prop_assume!(previous != ItemStatus::Depleted);
            let stamp = depletion_stamp(previous, ItemStatus::Depleted, None, requested, now);
            prop_assert_eq!(stamp, Some(requested.unwrap_or(now)));
        }
    }
}
