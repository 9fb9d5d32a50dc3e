//! Location registry service

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{Location, LocationRole};
use shared::validation::validate_location_name;

/// Location service for managing storage places
#[derive(Clone)]
pub struct LocationService {
    db: PgPool,
}

/// Location row as stored
#[derive(Debug, FromRow)]
pub(crate) struct LocationRow {
    pub id: i64,
    pub name: String,
    pub role: String,
}

impl TryFrom<LocationRow> for Location {
    type Error = AppError;

    fn try_from(row: LocationRow) -> Result<Self, Self::Error> {
        let role = LocationRole::parse(&row.role).ok_or_else(|| {
            AppError::Internal(format!("location {} has unknown role '{}'", row.id, row.role))
        })?;
        Ok(Location {
            id: row.id,
            name: row.name,
            role,
        })
    }
}

/// Location with the number of active items stored there
#[derive(Debug, Clone, Serialize)]
pub struct LocationSummary {
    #[serde(flatten)]
    pub location: Location,
    pub item_count: i64,
}

#[derive(Debug, FromRow)]
struct LocationSummaryRow {
    id: i64,
    name: String,
    role: String,
    item_count: i64,
}

/// Input for creating a location
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLocationInput {
    #[validate(length(min = 1, max = 200, message = "Location name must be 1-200 characters"))]
    pub name: String,
    pub role: LocationRole,
}

/// Input for updating a location
#[derive(Debug, Deserialize)]
pub struct UpdateLocationInput {
    pub name: Option<String>,
    pub role: Option<LocationRole>,
}

impl LocationService {
    /// Create a new LocationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all locations with their active item counts
    pub async fn list(&self) -> AppResult<Vec<LocationSummary>> {
        let rows = sqlx::query_as::<_, LocationSummaryRow>(
            r#"
            SELECT l.id, l.name, l.role,
                   COUNT(i.id) FILTER (WHERE i.status <> 5)::BIGINT AS item_count
            FROM locations l
            LEFT JOIN inventory_items i ON i.location_id = l.id
            GROUP BY l.id, l.name, l.role
            ORDER BY l.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|row| {
                let location = Location::try_from(LocationRow {
                    id: row.id,
                    name: row.name,
                    role: row.role,
                })?;
                Ok(LocationSummary {
                    location,
                    item_count: row.item_count,
                })
            })
            .collect()
    }

    /// Get a location by ID
    pub async fn get(&self, location_id: i64) -> AppResult<Location> {
        self.find(location_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location {}", location_id)))
    }

    pub(crate) async fn find(&self, location_id: i64) -> AppResult<Option<Location>> {
        let row = sqlx::query_as::<_, LocationRow>(
            "SELECT id, name, role FROM locations WHERE id = $1",
        )
        .bind(location_id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Location::try_from).transpose()
    }

    /// Create a location
    pub async fn create(&self, input: CreateLocationInput) -> AppResult<Location> {
        input.validate()?;
        let name = input.name.trim().to_string();
        validate_location_name(&name).map_err(|msg| AppError::validation("name", msg))?;

        let row = sqlx::query_as::<_, LocationRow>(
            "INSERT INTO locations (name, role) VALUES ($1, $2) RETURNING id, name, role",
        )
        .bind(&name)
        .bind(input.role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "name"))?;

        tracing::info!(location_id = row.id, name = %name, role = %input.role, "Location created");
        Location::try_from(row)
    }

    /// Rename a location or change its role
    pub async fn update(&self, location_id: i64, input: UpdateLocationInput) -> AppResult<Location> {
        let existing = self.get(location_id).await?;

        let name = match input.name {
            Some(name) => {
                let name = name.trim().to_string();
                validate_location_name(&name).map_err(|msg| AppError::validation("name", msg))?;
                name
            }
            None => existing.name,
        };
        let role = input.role.unwrap_or(existing.role);

        let row = sqlx::query_as::<_, LocationRow>(
            "UPDATE locations SET name = $2, role = $3 WHERE id = $1 RETURNING id, name, role",
        )
        .bind(location_id)
        .bind(&name)
        .bind(role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "name"))?;

        tracing::info!(location_id, name = %name, role = %role, "Location updated");
        Location::try_from(row)
    }

    /// Delete a location; items stored there keep existing without a location
    pub async fn delete(&self, location_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(location_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Location {}", location_id)));
        }

        tracing::info!(location_id, "Location deleted");
        Ok(())
    }
}
