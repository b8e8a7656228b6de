//! Customer service: validated CRUD, archiving, and paged listing.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::customer::{CreateCustomer, Customer, UpdateCustomer};
use crate::models::filter::TextFilter;
use crate::models::pagination::{PageQuery, PagedResult};
use crate::models::sorting::{de_opt_direction, OrderBy, SortDirection};

/// Columns searched by the free-text `query` parameter.
const SEARCH_FIELDS: &[&str] = &["name", "email", "phone", "address"];

/// Filter and sort parameters for listing customers.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFilters {
    pub query: Option<String>,
    #[serde(default)]
    pub include_archived: bool,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_name: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_email: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_phone: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_created_at: Option<SortDirection>,
}

impl CustomerFilters {
    /// Sortable columns in fixed declaration order, each slot driven by its
    /// own request field.
    pub fn order_by(&self) -> OrderBy {
        OrderBy::from_slots(
            &[
                ("name", self.order_by_name),
                ("email", self.order_by_email),
                ("phone", self.order_by_phone),
                ("created_at", self.order_by_created_at),
            ],
            ("created_at", SortDirection::Desc),
        )
    }
}

/// Create a customer; email and phone must both be unused.
pub async fn create(pool: &PgPool, input: &CreateCustomer) -> Result<Customer, AppError> {
    input.validate()?;

    // Independent lookups, issued concurrently.
    let (by_email, by_phone) = tokio::try_join!(
        find_by_email(pool, &input.email),
        find_by_phone(pool, &input.phone)
    )?;
    if by_email.is_some() {
        return Err(AppError::Conflict(format!(
            "Email '{}' is already registered",
            input.email
        )));
    }
    if by_phone.is_some() {
        return Err(AppError::Conflict(format!(
            "Phone '{}' is already registered",
            input.phone
        )));
    }

    let customer = sqlx::query_as::<_, Customer>(
        r#"
        INSERT INTO customers (name, email, phone, address)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.address)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Email or phone is already registered".to_string())
        }
        _ => AppError::Database(e),
    })?;

    Ok(customer)
}

/// Find customer by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Customer, AppError> {
    sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer not found".to_string()))
}

/// Find customer by email.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Customer>, AppError> {
    let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(customer)
}

/// Find customer by phone.
pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<Customer>, AppError> {
    let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE phone = $1")
        .bind(phone)
        .fetch_optional(pool)
        .await?;
    Ok(customer)
}

/// List customers with free-text search, sorting, and pagination.
pub async fn list(
    pool: &PgPool,
    filters: &CustomerFilters,
    page: &PageQuery,
) -> Result<PagedResult<Customer>, AppError> {
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

    let count_sql = format!("SELECT COUNT(*) FROM customers {where_clause}");
    let data_sql = format!(
        "SELECT * FROM customers {where_clause} {order_by} LIMIT {} OFFSET {}",
        page.limit(),
        page.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, Customer>(&data_sql);

    if let Some(pattern) = search.pattern() {
        count_query = count_query.bind(pattern.clone());
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, page))
}

/// Update a customer; a changed email or phone must not collide with
/// another customer's.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    input: &UpdateCustomer,
) -> Result<Customer, AppError> {
    input.validate()?;
    let existing = find_by_id(pool, id).await?;

    if let Some(ref email) = input.email {
        if find_by_email(pool, email)
            .await?
            .is_some_and(|c| c.id != existing.id)
        {
            return Err(AppError::Conflict(format!(
                "Email '{email}' is already registered"
            )));
        }
    }
    if let Some(ref phone) = input.phone {
        if find_by_phone(pool, phone)
            .await?
            .is_some_and(|c| c.id != existing.id)
        {
            return Err(AppError::Conflict(format!(
                "Phone '{phone}' is already registered"
            )));
        }
    }

    let customer = sqlx::query_as::<_, Customer>(
        r#"
        UPDATE customers SET
            name = COALESCE($2, name),
            email = COALESCE($3, email),
            phone = COALESCE($4, phone),
            address = COALESCE($5, address),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(existing.id)
    .bind(&input.name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(&input.address)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Email or phone is already registered".to_string())
        }
        _ => AppError::Database(e),
    })?;

    Ok(customer)
}

/// Delete a customer permanently.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let existing = find_by_id(pool, id).await?;
    sqlx::query("DELETE FROM customers WHERE id = $1")
        .bind(existing.id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Mark a customer archived. Idempotent.
pub async fn archive(pool: &PgPool, id: Uuid) -> Result<Customer, AppError> {
    set_archived(pool, id, true).await
}

/// Bring an archived customer back. Idempotent.
pub async fn restore(pool: &PgPool, id: Uuid) -> Result<Customer, AppError> {
    set_archived(pool, id, false).await
}

async fn set_archived(pool: &PgPool, id: Uuid, archived: bool) -> Result<Customer, AppError> {
    let existing = find_by_id(pool, id).await?;
    let customer = sqlx::query_as::<_, Customer>(
        "UPDATE customers SET is_archived = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(existing.id)
    .bind(archived)
    .fetch_one(pool)
    .await?;
    Ok(customer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sort_is_newest_first() {
        let filters = CustomerFilters::default();
        assert_eq!(filters.order_by().to_sql(), "ORDER BY created_at DESC");
    }

    #[test]
    fn each_sort_slot_drives_its_own_column() {
        let filters = CustomerFilters {
            order_by_email: Some(SortDirection::Asc),
            order_by_name: Some(SortDirection::Desc),
            ..Default::default()
        };
        // Declaration order, not request order: name before email.
        assert_eq!(
            filters.order_by().to_sql(),
            "ORDER BY name DESC, email ASC"
        );
    }

    #[test]
    fn search_covers_contact_columns() {
        let filter = TextFilter::new(SEARCH_FIELDS, Some("ada"));
        assert_eq!(
            filter.condition(1).as_deref(),
            Some("(name ILIKE $1 OR email ILIKE $1 OR phone ILIKE $1 OR address ILIKE $1)")
        );
    }
}
