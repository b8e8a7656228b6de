//! Warehouse service: validated CRUD, archiving, and paged listing.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::filter::TextFilter;
use crate::models::pagination::{PageQuery, PagedResult};
use crate::models::sorting::{de_opt_direction, OrderBy, SortDirection};
use crate::models::warehouse::{CreateWarehouse, UpdateWarehouse, Warehouse};

const SEARCH_FIELDS: &[&str] = &["name", "location"];

/// Filter and sort parameters for listing warehouses.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseFilters {
    pub query: Option<String>,
    #[serde(default)]
    pub include_archived: bool,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_name: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_location: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_capacity: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_created_at: Option<SortDirection>,
}

impl WarehouseFilters {
    pub fn order_by(&self) -> OrderBy {
        OrderBy::from_slots(
            &[
                ("name", self.order_by_name),
                ("location", self.order_by_location),
                ("capacity", self.order_by_capacity),
                ("created_at", self.order_by_created_at),
            ],
            ("created_at", SortDirection::Desc),
        )
    }
}

/// Create a warehouse; the name must be unused.
pub async fn create(pool: &PgPool, input: &CreateWarehouse) -> Result<Warehouse, AppError> {
    input.validate()?;

    if find_by_name(pool, &input.name).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Warehouse '{}' already exists",
            input.name
        )));
    }

    let warehouse = sqlx::query_as::<_, Warehouse>(
        r#"
        INSERT INTO warehouses (name, location, capacity)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(&input.name)
    .bind(&input.location)
    .bind(input.capacity)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(format!("Warehouse '{}' already exists", input.name))
        }
        _ => AppError::Database(e),
    })?;

    Ok(warehouse)
}

/// Find warehouse by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Warehouse, AppError> {
    sqlx::query_as::<_, Warehouse>("SELECT * FROM warehouses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse not found".to_string()))
}

/// Find warehouse by name.
pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Warehouse>, AppError> {
    let warehouse = sqlx::query_as::<_, Warehouse>("SELECT * FROM warehouses WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(warehouse)
}

/// List warehouses with free-text search, sorting, and pagination.
pub async fn list(
    pool: &PgPool,
    filters: &WarehouseFilters,
    page: &PageQuery,
) -> Result<PagedResult<Warehouse>, AppError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0usize;

    if !filters.include_archived {
        conditions.push("is_archived = FALSE".to_string());
    }

    let search = TextFilter::new(SEARCH_FIELDS, filters.query.as_deref());
    if search.is_active() {
        param_index += 1;
    }
    if let Some(condition) = search.condition(param_index) {
        conditions.push(condition);
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    let order_by = filters.order_by().to_sql();

    let count_sql = format!("SELECT COUNT(*) FROM warehouses {where_clause}");
    let data_sql = format!(
        "SELECT * FROM warehouses {where_clause} {order_by} LIMIT {} OFFSET {}",
        page.limit(),
        page.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, Warehouse>(&data_sql);

    if let Some(pattern) = search.pattern() {
        count_query = count_query.bind(pattern.clone());
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, page))
}

/// Update a warehouse; a changed name must not collide with another's.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    input: &UpdateWarehouse,
) -> Result<Warehouse, AppError> {
    input.validate()?;
    let existing = find_by_id(pool, id).await?;

    if let Some(ref name) = input.name {
        if find_by_name(pool, name)
            .await?
            .is_some_and(|w| w.id != existing.id)
        {
            return Err(AppError::Conflict(format!(
                "Warehouse '{name}' already exists"
            )));
        }
    }

    let warehouse = sqlx::query_as::<_, Warehouse>(
        r#"
        UPDATE warehouses SET
            name = COALESCE($2, name),
            location = COALESCE($3, location),
            capacity = COALESCE($4, capacity),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(existing.id)
    .bind(&input.name)
    .bind(&input.location)
    .bind(input.capacity)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Warehouse name is already taken".to_string())
        }
        _ => AppError::Database(e),
    })?;

    Ok(warehouse)
}

/// Delete a warehouse permanently. Fails with a conflict while goods
/// receipts still reference it.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let existing = find_by_id(pool, id).await?;
    sqlx::query("DELETE FROM warehouses WHERE id = $1")
        .bind(existing.id)
        .execute(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::Conflict(
                    "Warehouse is referenced by goods receipts and cannot be deleted".to_string(),
                )
            }
            _ => AppError::Database(e),
        })?;
    Ok(())
}

/// Mark a warehouse archived. Idempotent.
pub async fn archive(pool: &PgPool, id: Uuid) -> Result<Warehouse, AppError> {
    set_archived(pool, id, true).await
}

/// Bring an archived warehouse back. Idempotent.
pub async fn restore(pool: &PgPool, id: Uuid) -> Result<Warehouse, AppError> {
    set_archived(pool, id, false).await
}

async fn set_archived(pool: &PgPool, id: Uuid, archived: bool) -> Result<Warehouse, AppError> {
    let existing = find_by_id(pool, id).await?;
    let warehouse = sqlx::query_as::<_, Warehouse>(
        "UPDATE warehouses SET is_archived = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(existing.id)
    .bind(archived)
    .fetch_one(pool)
    .await?;
    Ok(warehouse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_sortable() {
        let filters = WarehouseFilters {
            order_by_capacity: Some(SortDirection::Desc),
            ..Default::default()
        };
        assert_eq!(filters.order_by().to_sql(), "ORDER BY capacity DESC");
    }

    #[test]
    fn search_covers_name_and_location() {
        let filter = TextFilter::new(SEARCH_FIELDS, Some("dock"));
        assert_eq!(
            filter.condition(1).as_deref(),
            Some("(name ILIKE $1 OR location ILIKE $1)")
        );
    }
}
