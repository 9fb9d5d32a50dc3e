//! Product catalog service
//!
//! All variants live in one `products` table; variant fields are kept in the
//! `details` JSONB column, tagged by `kind`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};

use crate::error::{AppError, AppResult};
use crate::models::{DisplayField, Product, ProductDetails, ProductIdentity, ProductKind};
use shared::validation::{
    validate_price, validate_product_details, validate_product_name, validate_sku, validate_upc,
};

const PRODUCT_COLUMNS: &str = "id, name, upc, sku, price, notes, category, details";

/// Product service for the catalog
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
pub(crate) struct ProductRow {
    pub id: i64,
    pub name: String,
    pub upc: String,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub notes: String,
    pub category: Option<String>,
    pub details: Json<ProductDetails>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            identity: ProductIdentity {
                name: row.name,
                upc: row.upc,
                sku: row.sku,
                price: row.price,
                notes: row.notes,
                category: row.category,
            },
            details: row.details.0,
        }
    }
}

/// Input for creating a product of any kind
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    #[serde(flatten)]
    pub identity: ProductIdentity,
    pub details: ProductDetails,
}

/// Product with the per-variant fields selected for display
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub display_name: String,
    pub display_fields: Vec<DisplayField>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            display_name: product.display_name(),
            display_fields: product.details.display_fields(),
            product,
        }
    }
}

/// Query for listing products
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub kind: Option<ProductKind>,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product; the UPC must be unique across every kind
    pub async fn create(&self, input: CreateProductInput) -> AppResult<Product> {
        let identity = normalize_identity(input.identity);
        validate_identity(&identity)?;
        validate_product_details(&input.details)
            .map_err(|(field, msg)| AppError::validation(field, msg))?;

        let kind = input.details.kind();
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (kind, name, upc, sku, price, notes, category, details)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(kind.as_str())
        .bind(&identity.name)
        .bind(&identity.upc)
        .bind(&identity.sku)
        .bind(identity.price)
        .bind(&identity.notes)
        .bind(&identity.category)
        .bind(Json(&input.details))
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "upc"))?;

        let product = Product::from(row);
        tracing::info!(
            product_id = product.id,
            kind = %kind,
            upc = %product.identity.upc,
            "Product created: {}",
            product.display_name()
        );
        Ok(product)
    }

    /// Get a product by ID
    pub async fn get(&self, product_id: i64) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {}", product_id)))?;

        Ok(row.into())
    }

    /// List products, optionally of one kind, ordered by SKU
    pub async fn list(&self, query: &ProductQuery) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            SELECT {} FROM products
            WHERE ($1::text IS NULL OR kind = $1)
            ORDER BY sku NULLS LAST, name
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(query.kind.map(|k| k.as_str()))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Find a product by a scanned code: UPC first, then SKU
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<Product>> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }

        let by_upc = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE upc = $1",
            PRODUCT_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.db)
        .await?;
        if let Some(row) = by_upc {
            return Ok(Some(row.into()));
        }

        let by_sku = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE sku = $1 ORDER BY id LIMIT 1",
            PRODUCT_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.db)
        .await?;

        Ok(by_sku.map(Product::from))
    }

    /// Like [`find_by_code`](Self::find_by_code) but a miss is a 404
    pub async fn lookup(&self, code: &str) -> AppResult<Product> {
        self.find_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product with code '{}'", code)))
    }
}

fn normalize_identity(identity: ProductIdentity) -> ProductIdentity {
    ProductIdentity {
        name: identity.name.trim().to_string(),
        upc: identity.upc.trim().to_string(),
        sku: identity
            .sku
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        category: identity
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        ..identity
    }
}

fn validate_identity(identity: &ProductIdentity) -> AppResult<()> {
    validate_product_name(&identity.name).map_err(|msg| AppError::validation("name", msg))?;
    validate_upc(&identity.upc).map_err(|msg| AppError::validation("upc", msg))?;
    if let Some(sku) = &identity.sku {
        validate_sku(sku).map_err(|msg| AppError::validation("sku", msg))?;
    }
    if let Some(price) = identity.price {
        validate_price(price).map_err(|msg| AppError::validation("price", msg))?;
    }
    if let Some(category) = &identity.category {
        if category.chars().count() > 50 {
            return Err(AppError::validation("category", "Category must be at most 50 characters"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HardwareDetails, HardwareKind};
    use std::str::FromStr;

    fn identity(name: &str, upc: &str, sku: Option<&str>) -> ProductIdentity {
        ProductIdentity {
            name: name.to_string(),
            upc: upc.to_string(),
            sku: sku.map(str::to_string),
            price: None,
            notes: String::new(),
            category: None,
        }
    }

    #[test]
    fn test_normalize_identity_trims_and_drops_blanks() {
        let normalized = normalize_identity(identity("  Nozzle  ", " 123 ", Some("  ")));
        assert_eq!(normalized.name, "Nozzle");
        assert_eq!(normalized.upc, "123");
        assert_eq!(normalized.sku, None);
    }

    #[test]
    fn test_validate_identity_reports_field() {
        let err = validate_identity(&identity("Spool", "", None)).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "upc"));

        let err = validate_identity(&identity("Spool", "123", Some("TOOLONGSKU"))).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "sku"));

        let mut priced = identity("Spool", "123", Some("PLA01"));
        priced.price = Some(Decimal::from_str("19.999").unwrap());
        let err = validate_identity(&priced).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "price"));

        let mut categorized = identity("Spool", "123", None);
        categorized.category = Some("C".repeat(51));
        let err = validate_identity(&categorized).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "category"));
        categorized.category = Some("C".repeat(50));
        assert!(validate_identity(&categorized).is_ok());
    }

    #[test]
    fn test_create_input_from_json() {
        let input: CreateProductInput = serde_json::from_value(serde_json::json!({
            "name": "Bambu PLA Basic",
            "upc": "6975337031234",
            "sku": "PLA-BK",
            "price": "19.99",
            "details": {
                "kind": "filament",
                "material": "PLA",
                "color": "Black",
                "hex_code": "#000000"
            }
        }))
        .unwrap();
        assert_eq!(input.details.kind(), ProductKind::Filament);
        assert_eq!(input.identity.sku.as_deref(), Some("PLA-BK"));
        assert!(validate_product_details(&input.details).is_ok());
    }

    #[test]
    fn test_view_selects_variant_fields() {
        let product = Product {
            id: 5,
            identity: identity("Hex Key Set", "HK-1", Some("HK1")),
            details: ProductDetails::Hardware(HardwareDetails {
                usage: "Maintenance".to_string(),
                hardware_kind: HardwareKind::Accessory,
            }),
        };
        let view = ProductView::from(product);
        assert_eq!(view.display_name, "Hex Key Set (Part #: HK1)");
        assert!(!view.display_fields.is_empty());

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["upc"], "HK-1");
        assert_eq!(json["details"]["kind"], "hardware");
    }
}
