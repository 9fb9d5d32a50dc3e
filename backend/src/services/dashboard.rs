//! Dashboard aggregates over active inventory

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::AppResult;
use crate::services::location::{LocationService, LocationSummary};

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

/// Labels and values for a chart, largest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub data: Vec<i64>,
}

impl ChartData {
    fn from_counts(counts: Vec<LabelCount>) -> Self {
        let mut counts = counts;
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
        let (labels, data) = counts.into_iter().map(|c| (c.label, c.count)).unzip();
        Self { labels, data }
    }
}

#[derive(Debug, FromRow)]
struct LabelCount {
    label: String,
    count: i64,
}

#[derive(Debug, FromRow)]
struct Totals {
    total_items: i64,
    total_value: Decimal,
    latest_added: Option<DateTime<Utc>>,
}

/// Quantity on hand per product
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SkuQuantity {
    pub product_id: i64,
    pub sku: Option<String>,
    pub name: String,
    pub kind: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_items: i64,
    pub total_value: Decimal,
    pub latest_added: Option<DateTime<Utc>>,
    pub items_by_kind: ChartData,
    pub inventory_by_sku: Vec<SkuQuantity>,
    pub filament_by_material: ChartData,
    pub filament_by_color: ChartData,
    pub locations: Vec<LocationSummary>,
}

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get(&self) -> AppResult<Dashboard> {
        let totals = sqlx::query_as::<_, Totals>(
            r#"
            SELECT COUNT(i.id)::BIGINT AS total_items,
                   COALESCE(SUM(p.price), 0) AS total_value,
                   MAX(i.date_added) AS latest_added
            FROM inventory_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.status <> 5
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let by_kind = sqlx::query_as::<_, LabelCount>(
            r#"
            SELECT p.kind AS label, COUNT(i.id)::BIGINT AS count
            FROM inventory_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.status <> 5
            GROUP BY p.kind
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let inventory_by_sku = sqlx::query_as::<_, SkuQuantity>(
            r#"
            SELECT p.id AS product_id, p.sku, p.name, p.kind, COUNT(i.id)::BIGINT AS quantity
            FROM inventory_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.status <> 5
            GROUP BY p.id, p.sku, p.name, p.kind
            ORDER BY quantity DESC, p.sku NULLS LAST
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let by_material = self.filament_counts("material").await?;
        let by_color = self.filament_counts("color").await?;
        let locations = LocationService::new(self.db.clone()).list().await?;

        Ok(Dashboard {
            total_items: totals.total_items,
            total_value: totals.total_value,
            latest_added: totals.latest_added,
            items_by_kind: ChartData::from_counts(by_kind),
            inventory_by_sku,
            filament_by_material: ChartData::from_counts(by_material),
            filament_by_color: ChartData::from_counts(by_color),
            locations,
        })
    }

    /// Active filament items grouped by a field of the filament details
    async fn filament_counts(&self, field: &str) -> AppResult<Vec<LabelCount>> {
        let rows = sqlx::query_as::<_, LabelCount>(
            r#"
            SELECT COALESCE(p.details ->> $1, 'Unknown') AS label, COUNT(i.id)::BIGINT AS count
            FROM inventory_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.status <> 5 AND p.kind = 'filament'
            GROUP BY 1
            "#,
        )
        .bind(field)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
