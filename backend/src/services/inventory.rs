//! Inventory item service: receiving, editing, search and export

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{
    evaluate_location_change, unique_item_code, EditAction, InventoryItem, ItemStatus, Location,
    LocationChange, PendingConfirmation, Product, ProductDetails, WarningLevel,
};
use crate::services::location::LocationService;
use crate::services::product::{ProductService, ProductView};

const ITEM_COLUMNS: &str = "id, product_id, location_id, user_id, sku, shipment, serial_number, \
                            status, date_added, last_modified, date_depleted";

/// Item joined with its product and location, for listings and export
pub(crate) const LISTING_SELECT: &str = r#"
    SELECT i.id, i.product_id, i.location_id, i.user_id, i.sku, i.shipment, i.serial_number,
           i.status, i.date_added, i.last_modified, i.date_depleted,
           p.name AS product_name, p.upc AS product_upc, p.sku AS product_sku,
           p.details AS product_details, l.name AS location_name
    FROM inventory_items i
    JOIN products p ON p.id = i.product_id
    LEFT JOIN locations l ON l.id = i.location_id
"#;

/// Inventory service for physical units
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
pub(crate) struct ItemRow {
    pub id: i64,
    pub product_id: i64,
    pub location_id: Option<i64>,
    pub user_id: Option<uuid::Uuid>,
    pub sku: Option<String>,
    pub shipment: Option<String>,
    pub serial_number: Option<String>,
    pub status: i16,
    pub date_added: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub date_depleted: Option<DateTime<Utc>>,
}

impl TryFrom<ItemRow> for InventoryItem {
    type Error = AppError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let status = ItemStatus::from_code(row.status).ok_or_else(|| {
            AppError::Internal(format!("item {} has unknown status {}", row.id, row.status))
        })?;
        Ok(InventoryItem {
            id: row.id,
            product_id: row.product_id,
            location_id: row.location_id,
            user_id: row.user_id,
            sku: row.sku,
            shipment: row.shipment,
            serial_number: row.serial_number,
            status,
            date_added: row.date_added,
            last_modified: row.last_modified,
            date_depleted: row.date_depleted,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ListingRow {
    #[sqlx(flatten)]
    pub item: ItemRow,
    pub product_name: String,
    pub product_upc: String,
    pub product_sku: Option<String>,
    pub product_details: Json<ProductDetails>,
    pub location_name: Option<String>,
}

/// One row of a search result
#[derive(Debug, Clone, Serialize)]
pub struct ItemListing {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub product_name: String,
    pub product_upc: String,
    pub product_sku: Option<String>,
    pub location_name: Option<String>,
    pub status_label: &'static str,
}

impl TryFrom<ListingRow> for ItemListing {
    type Error = AppError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let item = InventoryItem::try_from(row.item)?;
        let identity = crate::models::ProductIdentity {
            name: row.product_name,
            upc: row.product_upc.clone(),
            sku: row.product_sku.clone(),
            price: None,
            notes: String::new(),
            category: None,
        };
        Ok(ItemListing {
            status_label: item.status.label(),
            product_name: row.product_details.0.display_name(&identity),
            product_upc: row.product_upc,
            product_sku: row.product_sku,
            location_name: row.location_name,
            item,
        })
    }
}

/// An item with its product and location resolved
#[derive(Debug, Clone, Serialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub unique_code: String,
    pub product: ProductView,
    pub location: Option<Location>,
}

/// Input for receiving (adding) an item by scanning its product code
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReceiveItemInput {
    pub upc: Option<String>,
    pub sku: Option<String>,
    #[validate(length(max = 100, message = "Shipment must be at most 100 characters"))]
    pub shipment: Option<String>,
    pub location_id: Option<i64>,
    #[validate(length(max = 50, message = "Serial number must be at most 50 characters"))]
    pub serial_number: Option<String>,
    pub status: Option<ItemStatus>,
}

/// Result of a receive request
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReceiveOutcome {
    Received {
        item: ItemDetail,
    },
    /// No product matches the scanned code; nothing was written
    ProductRequired {
        upc: Option<String>,
        sku: Option<String>,
        message: String,
    },
}

/// Values to prefill the next receive form with
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct ReceiveDefaults {
    pub shipment: Option<String>,
    pub location_id: Option<i64>,
    pub status: ItemStatus,
}

/// Input for editing an item
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditItemInput {
    pub location_id: Option<i64>,
    pub status: Option<ItemStatus>,
    pub action: Option<EditAction>,
    #[serde(default)]
    pub acknowledged: bool,
    pub date_depleted: Option<DateTime<Utc>>,
    #[validate(length(max = 50, message = "Serial number must be at most 50 characters"))]
    pub serial_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub message: String,
    pub level: WarningLevel,
}

/// Result of an edit request
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EditOutcome {
    Updated {
        item: ItemDetail,
    },
    /// The location change needs acknowledgement; nothing was written
    PendingConfirmation {
        warning: Warning,
        pending_location: Location,
        current_status: ItemStatus,
        implied_status: ItemStatus,
    },
    Sold {
        item_id: i64,
    },
}

impl From<PendingConfirmation> for EditOutcome {
    fn from(pending: PendingConfirmation) -> Self {
        EditOutcome::PendingConfirmation {
            warning: Warning {
                message: pending.message,
                level: pending.level,
            },
            pending_location: pending.location,
            current_status: pending.current_status,
            implied_status: pending.implied_status,
        }
    }
}

/// What an edit resolves to before anything is written
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EditPlan {
    Write(InventoryItem),
    Confirm(PendingConfirmation),
    Sell,
}

/// Apply edit rules to `item` without touching storage.
///
/// Order: sell, deplete, location change, explicit status, serial number.
/// An explicit status is only honored when the location is not changing.
pub(crate) fn plan_edit(
    item: &InventoryItem,
    current_location: Option<&Location>,
    candidate: Option<Location>,
    input: &EditItemInput,
    now: DateTime<Utc>,
) -> EditPlan {
    let mut next = item.clone();

    match input.action {
        Some(EditAction::Sell) => return EditPlan::Sell,
        Some(EditAction::Deplete) => {
            next.apply_status(ItemStatus::Depleted, input.date_depleted, now);
        }
        None => {
            let moving = candidate.filter(|c| item.location_id != Some(c.id));
            if let Some(candidate) = moving {
                match evaluate_location_change(
                    item.status,
                    current_location,
                    candidate,
                    input.acknowledged,
                ) {
                    LocationChange::Apply { location, status } => {
                        next.location_id = Some(location.id);
                        next.apply_status(status, input.date_depleted, now);
                    }
                    LocationChange::Confirm(pending) => return EditPlan::Confirm(pending),
                }
            } else if let Some(status) = input.status {
                next.apply_status(status, input.date_depleted, now);
            }
        }
    }

    if let Some(serial) = &input.serial_number {
        let serial = serial.trim();
        next.serial_number = (!serial.is_empty()).then(|| serial.to_string());
    }
    next.last_modified = now;

    EditPlan::Write(next)
}

/// Search filters; blank values are ignored
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchQuery {
    pub sku: Option<String>,
    pub upc: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub serial_number: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl SearchQuery {
    /// Status filter, accepting a code, a name or a label
    pub fn status_filter(&self) -> AppResult<Option<ItemStatus>> {
        non_blank(&self.status)
            .map(|s| {
                ItemStatus::parse(s)
                    .ok_or_else(|| AppError::validation("status", format!("Unknown status '{}'", s)))
            })
            .transpose()
    }
}

/// Export columns, written even when there are no rows
const EXPORT_HEADERS: [&str; 7] = [
    "Product",
    "SKU",
    "UPC",
    "Status",
    "Serial Number",
    "Date Added",
    "Location",
];

/// One CSV row of the export, in `EXPORT_HEADERS` order
#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    product: &'a str,
    sku: &'a str,
    upc: &'a str,
    status: &'a str,
    serial_number: &'a str,
    date_added: String,
    location: &'a str,
}

/// Render listings as CSV with a header row
pub fn export_to_csv(listings: &[ItemListing]) -> AppResult<String> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(vec![]);
    wtr.write_record(EXPORT_HEADERS)
        .map_err(|e| AppError::Internal(format!("CSV write error: {}", e)))?;
    for listing in listings {
        wtr.serialize(ExportRecord {
            product: &listing.product_name,
            sku: listing.product_sku.as_deref().unwrap_or(""),
            upc: &listing.product_upc,
            status: listing.status_label,
            serial_number: listing.item.serial_number.as_deref().unwrap_or(""),
            date_added: listing.item.date_added.format("%Y-%m-%d %H:%M").to_string(),
            location: listing.location_name.as_deref().unwrap_or(""),
        })
        .map_err(|e| AppError::Internal(format!("CSV write error: {}", e)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV encoding error: {}", e)))
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    fn locations(&self) -> LocationService {
        LocationService::new(self.db.clone())
    }

    fn products(&self) -> ProductService {
        ProductService::new(self.db.clone())
    }

    /// Receive one unit of the product matching the scanned UPC or SKU
    pub async fn receive(&self, user: &AuthUser, input: ReceiveItemInput) -> AppResult<ReceiveOutcome> {
        input.validate()?;

        let upc = non_blank(&input.upc).map(str::to_string);
        let sku = non_blank(&input.sku).map(str::to_string);
        if upc.is_none() && sku.is_none() {
            return Err(AppError::validation("upc", "Scan a UPC or enter a SKU"));
        }

        let products = self.products();
        let mut product = match &upc {
            Some(code) => products.find_by_code(code).await?,
            None => None,
        };
        if product.is_none() {
            if let Some(code) = &sku {
                product = products.find_by_code(code).await?;
            }
        }
        let Some(product) = product else {
            tracing::info!(upc = ?upc, sku = ?sku, "Received code matches no product");
            return Ok(ReceiveOutcome::ProductRequired {
                message: "No product matches this code; create the product first".to_string(),
                upc,
                sku,
            });
        };

        let location = match input.location_id {
            Some(id) => Some(self.locations().get(id).await?),
            None => None,
        };
        let status = location
            .as_ref()
            .map(Location::implied_status)
            .or(input.status)
            .unwrap_or_default();
        let now = Utc::now();
        let date_depleted = (status == ItemStatus::Depleted).then_some(now);

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, username) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET username = EXCLUDED.username
            "#,
        )
        .bind(user.user_id)
        .bind(&user.username)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, ItemRow>(&format!(
            r#"
            INSERT INTO inventory_items (
                product_id, location_id, user_id, sku, shipment, serial_number,
                status, date_added, last_modified, date_depleted
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, $9)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(product.id)
        .bind(location.as_ref().map(|l| l.id))
        .bind(user.user_id)
        .bind(&product.identity.sku)
        .bind(non_blank(&input.shipment))
        .bind(non_blank(&input.serial_number))
        .bind(status.code())
        .bind(now)
        .bind(date_depleted)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let item = InventoryItem::try_from(row)?;
        tracing::info!(
            item_id = item.id,
            user = %user.username,
            "Inventory item added: {} (ID: {})",
            product.display_name(),
            item.id
        );

        Ok(ReceiveOutcome::Received {
            item: detail_of(item, product, location),
        })
    }

    /// Shipment, location and status of the most recently received item
    pub async fn receive_defaults(&self) -> AppResult<ReceiveDefaults> {
        let latest = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {} FROM inventory_items ORDER BY date_added DESC, id DESC LIMIT 1",
            ITEM_COLUMNS
        ))
        .fetch_optional(&self.db)
        .await?;

        match latest {
            Some(row) => {
                let item = InventoryItem::try_from(row)?;
                Ok(ReceiveDefaults {
                    shipment: item.shipment,
                    location_id: item.location_id,
                    status: item.status,
                })
            }
            None => Ok(ReceiveDefaults::default()),
        }
    }

    pub async fn get(&self, item_id: i64) -> AppResult<InventoryItem> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {} FROM inventory_items WHERE id = $1",
            ITEM_COLUMNS
        ))
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Inventory item {}", item_id)))?;

        row.try_into()
    }

    /// Item with product and location for the edit view
    pub async fn detail(&self, item_id: i64) -> AppResult<ItemDetail> {
        let item = self.get(item_id).await?;
        self.resolve(item).await
    }

    async fn resolve(&self, item: InventoryItem) -> AppResult<ItemDetail> {
        let product = self.products().get(item.product_id).await?;
        let location = match item.location_id {
            Some(id) => self.locations().find(id).await?,
            None => None,
        };
        Ok(detail_of(item, product, location))
    }

    /// Apply an edit; location changes follow the lifecycle rules
    pub async fn edit(&self, item_id: i64, input: EditItemInput) -> AppResult<EditOutcome> {
        input.validate()?;
        let item = self.get(item_id).await?;
        let locations = self.locations();
        let current_location = match item.location_id {
            Some(id) => locations.find(id).await?,
            None => None,
        };
        let candidate = match input.location_id {
            Some(id) => Some(locations.get(id).await?),
            None => None,
        };

        match plan_edit(&item, current_location.as_ref(), candidate, &input, Utc::now()) {
            EditPlan::Sell => {
                self.sell(item_id).await?;
                Ok(EditOutcome::Sold { item_id })
            }
            EditPlan::Confirm(pending) => {
                tracing::info!(
                    item_id,
                    level = ?pending.level,
                    location = %pending.location.name,
                    "Location change needs confirmation: {} -> {}",
                    pending.current_status,
                    pending.implied_status
                );
                Ok(pending.into())
            }
            EditPlan::Write(next) => {
                let saved = self.save(&next).await?;
                if saved.status == ItemStatus::Depleted && item.status != ItemStatus::Depleted {
                    let at = current_location
                        .as_ref()
                        .map(|l| l.name.as_str())
                        .unwrap_or("no location");
                    tracing::info!(item_id, "Inventory item DEPLETED at {}", at);
                } else {
                    tracing::info!(item_id, status = %saved.status, "Inventory item updated");
                }
                Ok(EditOutcome::Updated {
                    item: self.resolve(saved).await?,
                })
            }
        }
    }

    /// Remove a sold item from inventory
    pub async fn sell(&self, item_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(item_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Inventory item {}", item_id)));
        }

        tracing::info!(item_id, "Inventory item sold");
        Ok(())
    }

    async fn save(&self, item: &InventoryItem) -> AppResult<InventoryItem> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            r#"
            UPDATE inventory_items
            SET location_id = $2, status = $3, serial_number = $4,
                last_modified = $5, date_depleted = $6
            WHERE id = $1
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(item.id)
        .bind(item.location_id)
        .bind(item.status.code())
        .bind(&item.serial_number)
        .bind(item.last_modified)
        .bind(item.date_depleted)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Inventory item {}", item.id)))?;

        row.try_into()
    }

    /// Filtered item listing; depleted items only show up when filtering by status
    pub async fn search(&self, query: &SearchQuery) -> AppResult<Vec<ItemListing>> {
        let status = query.status_filter()?;

        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            r#"
            {}
            WHERE ($1::text IS NULL OR p.sku = $1)
              AND ($2::text IS NULL OR p.upc = $2)
              AND ($3::text IS NULL OR p.name ILIKE '%' || $3 || '%')
              AND (($4::smallint IS NULL AND i.status <> 5) OR i.status = $4)
              AND ($5::text IS NULL OR l.name ILIKE '%' || $5 || '%')
              AND ($6::text IS NULL OR i.serial_number = $6)
            ORDER BY i.date_added DESC, i.id DESC
            "#,
            LISTING_SELECT
        ))
        .bind(non_blank(&query.sku))
        .bind(non_blank(&query.upc))
        .bind(non_blank(&query.name))
        .bind(status.map(|s| s.code()))
        .bind(non_blank(&query.location))
        .bind(non_blank(&query.serial_number))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ItemListing::try_from).collect()
    }

    /// CSV of the filtered listing
    pub async fn export(&self, query: &SearchQuery) -> AppResult<String> {
        let listings = self.search(query).await?;
        tracing::info!(rows = listings.len(), "Inventory exported");
        export_to_csv(&listings)
    }
}

fn detail_of(item: InventoryItem, product: Product, location: Option<Location>) -> ItemDetail {
    ItemDetail {
        unique_code: unique_item_code(item.id),
        product: product.into(),
        location,
        item,
    }
}
