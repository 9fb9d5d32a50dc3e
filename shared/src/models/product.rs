//! Product catalog models
//!
//! Every product shares an identity record (name, UPC, SKU, price) and carries
//! exactly one set of variant-specific details.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product definition; inventory items are units of one of these
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(flatten)]
    pub identity: ProductIdentity,
    pub details: ProductDetails,
}

impl Product {
    pub fn kind(&self) -> ProductKind {
        self.details.kind()
    }

    pub fn display_name(&self) -> String {
        self.details.display_name(&self.identity)
    }
}

/// Fields common to every product variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductIdentity {
    pub name: String,
    /// Scannable code; unique across all variants
    pub upc: String,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub notes: String,
    pub category: Option<String>,
}

/// Variant discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Filament,
    Printer,
    Dryer,
    Ams,
    Hardware,
}

impl ProductKind {
    pub const ALL: [ProductKind; 5] = [
        ProductKind::Filament,
        ProductKind::Printer,
        ProductKind::Dryer,
        ProductKind::Ams,
        ProductKind::Hardware,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Filament => "filament",
            ProductKind::Printer => "printer",
            ProductKind::Dryer => "dryer",
            ProductKind::Ams => "ams",
            ProductKind::Hardware => "hardware",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductKind::Filament => "Filament",
            ProductKind::Printer => "Printer",
            ProductKind::Dryer => "Dryer",
            ProductKind::Ams => "AMS",
            ProductKind::Hardware => "Hardware",
        }
    }
}

impl std::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Variant-specific product attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductDetails {
    Filament(FilamentDetails),
    Printer(PrinterDetails),
    Dryer(DryerDetails),
    Ams(AmsDetails),
    Hardware(HardwareDetails),
}

/// Optional min/max/ideal temperature in degrees Celsius
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min_c: Option<i32>,
    pub max_c: Option<i32>,
    pub ideal_c: Option<i32>,
}

impl TemperatureRange {
    fn describe(&self) -> Option<String> {
        match (self.min_c, self.max_c, self.ideal_c) {
            (Some(min), Some(max), Some(ideal)) => Some(format!("{}-{} °C (ideal {} °C)", min, max, ideal)),
            (Some(min), Some(max), None) => Some(format!("{}-{} °C", min, max)),
            (_, _, Some(ideal)) => Some(format!("{} °C", ideal)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilamentDetails {
    pub material: String,
    pub material_type: Option<String>,
    pub color: String,
    /// `#RRGGBB`
    pub hex_code: String,
    #[serde(default)]
    pub print_temp: TemperatureRange,
    #[serde(default)]
    pub dry_temp: TemperatureRange,
    pub dry_time_hrs: Option<i32>,
    /// Spool size, e.g. "1kg"
    pub size: Option<String>,
}

fn default_manufacturer() -> String {
    "Bambu Lab".to_string()
}

fn default_printer_model() -> String {
    "X1 Carbon".to_string()
}

fn default_ams_model() -> String {
    "AMS".to_string()
}

fn default_dryer_slots() -> i32 {
    1
}

fn default_ams_slots() -> i32 {
    4
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterDetails {
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,
    #[serde(default = "default_printer_model")]
    pub model: String,
    pub extruder_count: i32,
    pub bed_length_mm: Option<i32>,
    pub bed_width_mm: Option<i32>,
    pub max_height_mm: Option<i32>,
    pub print_volume_mm3: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DryerDetails {
    pub manufacturer: String,
    pub model: String,
    #[serde(default = "default_dryer_slots")]
    pub slot_count: i32,
    pub max_temp_c: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmsDetails {
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,
    #[serde(default = "default_ams_model")]
    pub model: String,
    #[serde(default = "default_ams_slots")]
    pub slot_count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareKind {
    Accessory,
    Parts,
    #[default]
    Hardware,
}

impl HardwareKind {
    pub fn label(&self) -> &'static str {
        match self {
            HardwareKind::Accessory => "Accessory",
            HardwareKind::Parts => "Parts",
            HardwareKind::Hardware => "Hardware",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareDetails {
    #[serde(default)]
    pub usage: String,
    #[serde(default)]
    pub hardware_kind: HardwareKind,
}

/// A labelled value shown for a product, selected per variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayField {
    pub label: String,
    pub value: String,
}

impl DisplayField {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

impl ProductDetails {
    pub fn kind(&self) -> ProductKind {
        match self {
            ProductDetails::Filament(_) => ProductKind::Filament,
            ProductDetails::Printer(_) => ProductKind::Printer,
            ProductDetails::Dryer(_) => ProductKind::Dryer,
            ProductDetails::Ams(_) => ProductKind::Ams,
            ProductDetails::Hardware(_) => ProductKind::Hardware,
        }
    }

    /// Short name used in listings and log lines
    pub fn display_name(&self, identity: &ProductIdentity) -> String {
        match self {
            ProductDetails::Filament(f) => format!("{} ({})", identity.name, f.color),
            ProductDetails::Printer(p) => format!("{} - {}", identity.name, p.model),
            ProductDetails::Dryer(d) => format!("{} (Part #: {})", identity.name, d.model),
            ProductDetails::Ams(a) => format!("{} (Part #: {})", identity.name, a.model),
            ProductDetails::Hardware(_) => format!(
                "{} (Part #: {})",
                identity.name,
                identity.sku.as_deref().unwrap_or("-")
            ),
        }
    }

    /// Variant-specific fields to show next to an item
    pub fn display_fields(&self) -> Vec<DisplayField> {
        let mut fields = Vec::new();
        match self {
            ProductDetails::Filament(f) => {
                fields.push(DisplayField::new("Material", f.material.clone()));
                if let Some(material_type) = &f.material_type {
                    fields.push(DisplayField::new("Type", material_type.clone()));
                }
                fields.push(DisplayField::new("Color", f.color.clone()));
                fields.push(DisplayField::new("Hex", f.hex_code.clone()));
                if let Some(temp) = f.print_temp.describe() {
                    fields.push(DisplayField::new("Print temperature", temp));
                }
                if let Some(temp) = f.dry_temp.describe() {
                    fields.push(DisplayField::new("Dry temperature", temp));
                }
                if let Some(hours) = f.dry_time_hrs {
                    fields.push(DisplayField::new("Dry time", format!("{} h", hours)));
                }
                if let Some(size) = &f.size {
                    fields.push(DisplayField::new("Size", size.clone()));
                }
            }
            ProductDetails::Printer(p) => {
                fields.push(DisplayField::new("Manufacturer", p.manufacturer.clone()));
                fields.push(DisplayField::new("Model", p.model.clone()));
                fields.push(DisplayField::new("Extruders", p.extruder_count.to_string()));
                if let (Some(length), Some(width)) = (p.bed_length_mm, p.bed_width_mm) {
                    fields.push(DisplayField::new("Bed", format!("{} x {} mm", length, width)));
                }
                if let Some(height) = p.max_height_mm {
                    fields.push(DisplayField::new("Max height", format!("{} mm", height)));
                }
            }
            ProductDetails::Dryer(d) => {
                fields.push(DisplayField::new("Manufacturer", d.manufacturer.clone()));
                fields.push(DisplayField::new("Model", d.model.clone()));
                fields.push(DisplayField::new("Slots", d.slot_count.to_string()));
                if let Some(max) = d.max_temp_c {
                    fields.push(DisplayField::new("Max temperature", format!("{} °C", max)));
                }
            }
            ProductDetails::Ams(a) => {
                fields.push(DisplayField::new("Manufacturer", a.manufacturer.clone()));
                fields.push(DisplayField::new("Model", a.model.clone()));
                fields.push(DisplayField::new("Slots", a.slot_count.to_string()));
            }
            ProductDetails::Hardware(h) => {
                fields.push(DisplayField::new("Kind", h.hardware_kind.label()));
                if !h.usage.is_empty() {
                    fields.push(DisplayField::new("Usage", h.usage.clone()));
                }
            }
        }
        fields
    }
}
