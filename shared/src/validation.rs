//! Field validation for catalog and inventory input

use rust_decimal::Decimal;

use crate::models::{ProductDetails, TemperatureRange, UNIQUE_PAYLOAD_PREFIX};

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate product name (1-255 characters)
pub fn validate_product_name(name: &str) -> Result<(), &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Product name cannot be empty");
    }
    if name.chars().count() > 255 {
        return Err("Product name must be at most 255 characters");
    }
    Ok(())
}

/// Validate a UPC: 1-50 printable ASCII characters so it can be encoded as Code128.
/// The `INV-` prefix is reserved for unique item labels.
pub fn validate_upc(upc: &str) -> Result<(), &'static str> {
    if upc.trim().is_empty() {
        return Err("UPC cannot be empty");
    }
    if upc.starts_with(UNIQUE_PAYLOAD_PREFIX) {
        return Err("UPC cannot start with the item code prefix INV-");
    }
    if upc.len() > 50 {
        return Err("UPC must be at most 50 characters");
    }
    if !upc.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
        return Err("UPC must contain printable ASCII characters only");
    }
    Ok(())
}

/// Validate internal SKU (1-8 characters)
pub fn validate_sku(sku: &str) -> Result<(), &'static str> {
    if sku.trim().is_empty() {
        return Err("SKU cannot be blank");
    }
    if sku.chars().count() > 8 {
        return Err("SKU must be at most 8 characters");
    }
    Ok(())
}

/// Validate unit price: non-negative, at most 2 decimal places, below 10000
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    if price.normalize().scale() > 2 {
        return Err("Price can have at most 2 decimal places");
    }
    if price >= Decimal::from(10_000) {
        return Err("Price must be below 10000");
    }
    Ok(())
}

/// Validate `#RRGGBB` color code
pub fn validate_hex_code(hex: &str) -> Result<(), &'static str> {
    let digits = hex.strip_prefix('#').ok_or("Hex code must start with '#'")?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("Hex code must be '#' followed by 6 hex digits");
    }
    Ok(())
}

/// Validate that min <= ideal <= max where the values are given
pub fn validate_temperature_range(range: &TemperatureRange) -> Result<(), &'static str> {
    if let (Some(min), Some(max)) = (range.min_c, range.max_c) {
        if min > max {
            return Err("Minimum temperature cannot exceed maximum");
        }
    }
    if let (Some(min), Some(ideal)) = (range.min_c, range.ideal_c) {
        if ideal < min {
            return Err("Ideal temperature is below the minimum");
        }
    }
    if let (Some(max), Some(ideal)) = (range.max_c, range.ideal_c) {
        if ideal > max {
            return Err("Ideal temperature is above the maximum");
        }
    }
    Ok(())
}

/// Validate a count that must be at least 1 (extruders, slots)
pub fn validate_positive_count(count: i32) -> Result<(), &'static str> {
    if count < 1 {
        return Err("Count must be at least 1");
    }
    Ok(())
}

/// Validate variant-specific fields, returning the offending field name on error
pub fn validate_product_details(
    details: &ProductDetails,
) -> Result<(), (&'static str, &'static str)> {
    match details {
        ProductDetails::Filament(f) => {
            if f.material.trim().is_empty() {
                return Err(("material", "Material cannot be empty"));
            }
            if f.color.trim().is_empty() {
                return Err(("color", "Color cannot be empty"));
            }
            validate_hex_code(&f.hex_code).map_err(|e| ("hex_code", e))?;
            validate_temperature_range(&f.print_temp).map_err(|e| ("print_temp", e))?;
            validate_temperature_range(&f.dry_temp).map_err(|e| ("dry_temp", e))?;
            if f.dry_time_hrs.is_some_and(|h| h < 0) {
                return Err(("dry_time_hrs", "Dry time cannot be negative"));
            }
        }
        ProductDetails::Printer(p) => {
            validate_positive_count(p.extruder_count).map_err(|e| ("extruder_count", e))?;
        }
        ProductDetails::Dryer(d) => {
            if d.model.trim().is_empty() {
                return Err(("model", "Model cannot be empty"));
            }
            validate_positive_count(d.slot_count).map_err(|e| ("slot_count", e))?;
        }
        ProductDetails::Ams(a) => {
            validate_positive_count(a.slot_count).map_err(|e| ("slot_count", e))?;
        }
        ProductDetails::Hardware(_) => {}
    }
    Ok(())
}

// ============================================================================
// Location Validations
// ============================================================================

/// Validate location name (1-200 characters)
pub fn validate_location_name(name: &str) -> Result<(), &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Location name cannot be empty");
    }
    if name.chars().count() > 200 {
        return Err("Location name must be at most 200 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AmsDetails, FilamentDetails};
    use std::str::FromStr;

    #[test]
    fn test_validate_upc() {
        assert!(validate_upc("6975337031234").is_ok());
        assert!(validate_upc("ABC-123").is_ok());
        assert!(validate_upc("").is_err());
        assert!(validate_upc("   ").is_err());
        assert!(validate_upc("ÅBC").is_err());
        assert!(validate_upc(&"1".repeat(51)).is_err());
        assert!(validate_upc("INV-232").is_err());
        assert!(validate_upc("INV-abc").is_err());
        assert!(validate_upc("XINV-232").is_ok());
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("A00-K0").is_ok());
        assert!(validate_sku("123456789").is_err());
        assert!(validate_sku(" ").is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Decimal::from_str("24.99").unwrap()).is_ok());
        assert!(validate_price(Decimal::from_str("24.990").unwrap()).is_ok());
        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(Decimal::from_str("-1").unwrap()).is_err());
        assert!(validate_price(Decimal::from_str("1.999").unwrap()).is_err());
        assert!(validate_price(Decimal::from(10_000)).is_err());
    }

    #[test]
    fn test_validate_hex_code() {
        assert!(validate_hex_code("#FFaa00").is_ok());
        assert!(validate_hex_code("FFAA00").is_err());
        assert!(validate_hex_code("#FFAA0").is_err());
        assert!(validate_hex_code("#GGGGGG").is_err());
    }

    #[test]
    fn test_validate_temperature_range() {
        let ok = TemperatureRange {
            min_c: Some(190),
            max_c: Some(230),
            ideal_c: Some(220),
        };
        assert!(validate_temperature_range(&ok).is_ok());
        assert!(validate_temperature_range(&TemperatureRange::default()).is_ok());

        let inverted = TemperatureRange {
            min_c: Some(230),
            max_c: Some(190),
            ideal_c: None,
        };
        assert!(validate_temperature_range(&inverted).is_err());

        let ideal_too_hot = TemperatureRange {
            min_c: None,
            max_c: Some(230),
            ideal_c: Some(240),
        };
        assert!(validate_temperature_range(&ideal_too_hot).is_err());
    }

    #[test]
    fn test_validate_product_details_reports_field() {
        let filament = ProductDetails::Filament(FilamentDetails {
            material: "PETG".to_string(),
            material_type: None,
            color: "Black".to_string(),
            hex_code: "black".to_string(),
            print_temp: TemperatureRange::default(),
            dry_temp: TemperatureRange::default(),
            dry_time_hrs: None,
            size: None,
        });
        assert_eq!(validate_product_details(&filament).unwrap_err().0, "hex_code");

        let ams = ProductDetails::Ams(AmsDetails {
            manufacturer: "Bambu Lab".to_string(),
            model: "AMS lite".to_string(),
            slot_count: 0,
        });
        assert_eq!(validate_product_details(&ams).unwrap_err().0, "slot_count");
    }

    #[test]
    fn test_validate_location_name() {
        assert!(validate_location_name("Dry Storage").is_ok());
        assert!(validate_location_name("  ").is_err());
        assert!(validate_location_name(&"x".repeat(201)).is_err());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Whole cents from 0.00 to 9999.99 are valid prices
        #[test]
        fn prop_cent_prices_valid(cents in 0i64..1_000_000) {
            prop_assert!(validate_price(Decimal::new(cents, 2)).is_ok());
        }

        /// Sub-cent prices are rejected
        #[test]
        fn prop_sub_cent_prices_rejected(mills in 1i64..10_000_000) {
            prop_assume!(mills % 10 != 0);
            prop_assert!(validate_price(Decimal::new(mills, 3)).is_err());
        }

        #[test]
        fn prop_generated_hex_codes_valid(hex in "#[0-9a-fA-F]{6}") {
            prop_assert!(validate_hex_code(&hex).is_ok());
        }

        /// Printable ASCII up to 50 characters is a valid UPC
        #[test]
        fn prop_printable_upc_valid(upc in "[!-~]{1,50}") {
            prop_assume!(!upc.starts_with("INV-"));
            prop_assert!(validate_upc(&upc).is_ok());
        }
    }
}
