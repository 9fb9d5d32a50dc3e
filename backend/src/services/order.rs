//! Orders and shipments with persisted item membership

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::Order;
use crate::services::inventory::{ItemListing, ListingRow, LISTING_SELECT};

/// Order service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: i64,
    order_num: String,
    tracking: Option<String>,
    created_at: DateTime<Utc>,
    item_count: i64,
}

/// Order with its number of items
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: Order,
    pub is_shipment: bool,
    pub item_count: i64,
}

impl From<OrderRow> for OrderSummary {
    fn from(row: OrderRow) -> Self {
        let order = Order {
            id: row.id,
            order_num: row.order_num,
            tracking: row.tracking,
            created_at: row.created_at,
        };
        Self {
            is_shipment: order.is_shipment(),
            item_count: row.item_count,
            order,
        }
    }
}

/// Order with the items it contains
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub summary: OrderSummary,
    pub items: Vec<ItemListing>,
}

/// Input for creating an order; a tracking code makes it a shipment
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderInput {
    #[validate(length(min = 1, max = 100, message = "Order number must be 1-100 characters"))]
    pub order_num: String,
    #[validate(length(max = 100, message = "Tracking code must be at most 100 characters"))]
    pub tracking: Option<String>,
}

const ORDER_SELECT: &str = r#"
    SELECT o.id, o.order_num, o.tracking, o.created_at,
           COUNT(oi.item_id)::BIGINT AS item_count
    FROM orders o
    LEFT JOIN order_items oi ON oi.order_id = o.id
"#;

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateOrderInput) -> AppResult<OrderSummary> {
        input.validate()?;
        let order_num = input.order_num.trim();
        if order_num.is_empty() {
            return Err(AppError::validation("order_num", "Order number cannot be blank"));
        }
        let tracking = input
            .tracking
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (order_num, tracking)
            VALUES ($1, $2)
            RETURNING id, order_num, tracking, created_at, 0::BIGINT AS item_count
            "#,
        )
        .bind(order_num)
        .bind(tracking)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(order_id = row.id, order_num = %row.order_num, "Order created");
        Ok(row.into())
    }

    pub async fn list(&self) -> AppResult<Vec<OrderSummary>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{} GROUP BY o.id ORDER BY o.created_at DESC, o.id DESC",
            ORDER_SELECT
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(OrderSummary::from).collect())
    }

    async fn summary(&self, order_id: i64) -> AppResult<OrderSummary> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "{} WHERE o.id = $1 GROUP BY o.id",
            ORDER_SELECT
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {}", order_id)))?;

        Ok(row.into())
    }

    pub async fn get(&self, order_id: i64) -> AppResult<OrderDetail> {
        let summary = self.summary(order_id).await?;

        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            r#"
            {}
            JOIN order_items oi ON oi.item_id = i.id
            WHERE oi.order_id = $1
            ORDER BY oi.added_at, i.id
            "#,
            LISTING_SELECT
        ))
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        let items = rows
            .into_iter()
            .map(ItemListing::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(OrderDetail { summary, items })
    }

    /// Add an item to an order; adding it twice is a no-op
    pub async fn add_item(&self, order_id: i64, item_id: i64) -> AppResult<OrderDetail> {
        self.summary(order_id).await?;

        let item_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM inventory_items WHERE id = $1)",
        )
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;
        if !item_exists {
            return Err(AppError::NotFound(format!("Inventory item {}", item_id)));
        }

        sqlx::query(
            "INSERT INTO order_items (order_id, item_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(order_id)
        .bind(item_id)
        .execute(&self.db)
        .await?;

        tracing::info!(order_id, item_id, "Item added to order");
        self.get(order_id).await
    }

    pub async fn remove_item(&self, order_id: i64, item_id: i64) -> AppResult<OrderDetail> {
        let result = sqlx::query("DELETE FROM order_items WHERE order_id = $1 AND item_id = $2")
            .bind(order_id)
            .bind(item_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Item {} in order {}",
                item_id, order_id
            )));
        }

        tracing::info!(order_id, item_id, "Item removed from order");
        self.get(order_id).await
    }
}
