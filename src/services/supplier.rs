//! Supplier service: validated CRUD, archiving, and paged listing.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::filter::TextFilter;
use crate::models::pagination::{PageQuery, PagedResult};
use crate::models::sorting::{de_opt_direction, OrderBy, SortDirection};
use crate::models::supplier::{CreateSupplier, Supplier, UpdateSupplier};

const SEARCH_FIELDS: &[&str] = &["name", "contact_person", "email", "phone"];

/// Filter and sort parameters for listing suppliers.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SupplierFilters {
    pub query: Option<String>,
    #[serde(default)]
    pub include_archived: bool,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_name: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_contact_person: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_email: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_created_at: Option<SortDirection>,
}

impl SupplierFilters {
    pub fn order_by(&self) -> OrderBy {
        OrderBy::from_slots(
            &[
                ("name", self.order_by_name),
                ("contact_person", self.order_by_contact_person),
                ("email", self.order_by_email),
                ("created_at", self.order_by_created_at),
            ],
            ("created_at", SortDirection::Desc),
        )
    }
}

/// Create a supplier; the name must be unused.
pub async fn create(pool: &PgPool, input: &CreateSupplier) -> Result<Supplier, AppError> {
    input.validate()?;

    if find_by_name(pool, &input.name).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Supplier '{}' already exists",
            input.name
        )));
    }

    let supplier = sqlx::query_as::<_, Supplier>(
        r#"
        INSERT INTO suppliers (name, contact_person, email, phone, address)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&input.name)
    .bind(&input.contact_person)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.address)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(format!("Supplier '{}' already exists", input.name))
        }
        _ => AppError::Database(e),
    })?;

    Ok(supplier)
}

/// Find supplier by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Supplier, AppError> {
    sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier not found".to_string()))
}

/// Find supplier by name.
pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Supplier>, AppError> {
    let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(supplier)
}

/// List suppliers with free-text search, sorting, and pagination.
pub async fn list(
    pool: &PgPool,
    filters: &SupplierFilters,
    page: &PageQuery,
) -> Result<PagedResult<Supplier>, AppError> {
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

    let count_sql = format!("SELECT COUNT(*) FROM suppliers {where_clause}");
    let data_sql = format!(
        "SELECT * FROM suppliers {where_clause} {order_by} LIMIT {} OFFSET {}",
        page.limit(),
        page.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, Supplier>(&data_sql);

    if let Some(pattern) = search.pattern() {
        count_query = count_query.bind(pattern.clone());
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, page))
}

/// Update a supplier; a changed name must not collide with another supplier's.
pub async fn update(pool: &PgPool, id: Uuid, input: &UpdateSupplier) -> Result<Supplier, AppError> {
    input.validate()?;
    let existing = find_by_id(pool, id).await?;

    if let Some(ref name) = input.name {
        if find_by_name(pool, name)
            .await?
            .is_some_and(|s| s.id != existing.id)
        {
            return Err(AppError::Conflict(format!("Supplier '{name}' already exists")));
        }
    }

    let supplier = sqlx::query_as::<_, Supplier>(
        r#"
        UPDATE suppliers SET
            name = COALESCE($2, name),
            contact_person = COALESCE($3, contact_person),
            email = COALESCE($4, email),
            phone = COALESCE($5, phone),
            address = COALESCE($6, address),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(existing.id)
    .bind(&input.name)
    .bind(&input.contact_person)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.address)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Supplier name is already taken".to_string())
        }
        _ => AppError::Database(e),
    })?;

    Ok(supplier)
}

/// Delete a supplier permanently. Fails with a conflict while goods
/// receipts still reference it.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let existing = find_by_id(pool, id).await?;
    sqlx::query("DELETE FROM suppliers WHERE id = $1")
        .bind(existing.id)
        .execute(pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::Conflict(
                    "Supplier is referenced by goods receipts and cannot be deleted".to_string(),
                )
            }
            _ => AppError::Database(e),
        })?;
    Ok(())
}

/// Mark a supplier archived. Idempotent.
pub async fn archive(pool: &PgPool, id: Uuid) -> Result<Supplier, AppError> {
    set_archived(pool, id, true).await
}

/// Bring an archived supplier back. Idempotent.
pub async fn restore(pool: &PgPool, id: Uuid) -> Result<Supplier, AppError> {
    set_archived(pool, id, false).await
}

async fn set_archived(pool: &PgPool, id: Uuid, archived: bool) -> Result<Supplier, AppError> {
    let existing = find_by_id(pool, id).await?;
    let supplier = sqlx::query_as::<_, Supplier>(
        "UPDATE suppliers SET is_archived = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(existing.id)
    .bind(archived)
    .fetch_one(pool)
    .await?;
    Ok(supplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_person_slot_drives_contact_person_column() {
        let filters = SupplierFilters {
            order_by_contact_person: Some(SortDirection::Asc),
            ..Default::default()
        };
        assert_eq!(filters.order_by().to_sql(), "ORDER BY contact_person ASC");
    }

    #[test]
    fn name_slot_does_not_leak_into_other_columns() {
        let filters = SupplierFilters {
            order_by_name: Some(SortDirection::Desc),
            ..Default::default()
        };
        let order = filters.order_by();
        assert_eq!(order.terms(), &[("name", SortDirection::Desc)]);
    }

    #[test]
    fn mixed_slots_keep_declaration_order() {
        let filters = SupplierFilters {
            order_by_created_at: Some(SortDirection::Asc),
            order_by_contact_person: Some(SortDirection::Desc),
            ..Default::default()
        };
        assert_eq!(
            filters.order_by().to_sql(),
            "ORDER BY contact_person DESC, created_at ASC"
        );
    }
}
