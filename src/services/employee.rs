//! Employee account service: validated CRUD, deactivation, and paged listing.
//!
//! Employees soft-delete through `is_active` rather than an archive flag, so
//! deactivated accounts also stop authenticating.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::employee::{CreateEmployee, Employee, EmployeeResponse, UpdateEmployee};
use crate::models::filter::TextFilter;
use crate::models::pagination::{PageQuery, PagedResult};
use crate::models::sorting::{de_opt_direction, OrderBy, SortDirection};
use crate::services::auth;

const SEARCH_FIELDS: &[&str] = &["username", "email", "full_name"];

/// Filter and sort parameters for listing employees.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeFilters {
    pub query: Option<String>,
    #[serde(default)]
    pub include_archived: bool,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_username: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_email: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_full_name: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_created_at: Option<SortDirection>,
}

impl EmployeeFilters {
    pub fn order_by(&self) -> OrderBy {
        OrderBy::from_slots(
            &[
                ("username", self.order_by_username),
                ("email", self.order_by_email),
                ("full_name", self.order_by_full_name),
                ("created_at", self.order_by_created_at),
            ],
            ("created_at", SortDirection::Desc),
        )
    }
}

/// Create an employee account; username and email must both be unused.
pub async fn create(pool: &PgPool, input: &CreateEmployee) -> Result<Employee, AppError> {
    input.validate()?;

    // Independent lookups, issued concurrently.
    let (by_username, by_email) = tokio::try_join!(
        find_by_username(pool, &input.username),
        find_by_email(pool, &input.email)
    )?;
    if by_username.is_some() {
        return Err(AppError::Conflict(format!(
            "Username '{}' is already taken",
            input.username
        )));
    }
    if by_email.is_some() {
        return Err(AppError::Conflict(format!(
            "Email '{}' is already registered",
            input.email
        )));
    }

    let password_hash = auth::hash_password(&input.password)?;

    let employee = sqlx::query_as::<_, Employee>(
        r#"
        INSERT INTO employees (username, email, password_hash, full_name, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&input.username)
    .bind(&input.email)
    .bind(&password_hash)
    .bind(&input.full_name)
    .bind(input.role)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Username or email already exists".to_string())
        }
        _ => AppError::Database(e),
    })?;

    Ok(employee)
}

/// Find employee by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Employee, AppError> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))
}

/// Find employee by username.
pub async fn find_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<Employee>, AppError> {
    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(employee)
}

/// Find employee by email.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Employee>, AppError> {
    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(employee)
}

/// List employees with free-text search, sorting, and pagination. Returns
/// response DTOs so password hashes never leave the service.
pub async fn list(
    pool: &PgPool,
    filters: &EmployeeFilters,
    page: &PageQuery,
) -> Result<PagedResult<EmployeeResponse>, AppError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0usize;

    if !filters.include_archived {
        conditions.push("is_active = TRUE".to_string());
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

    let count_sql = format!("SELECT COUNT(*) FROM employees {where_clause}");
    let data_sql = format!(
        "SELECT * FROM employees {where_clause} {order_by} LIMIT {} OFFSET {}",
        page.limit(),
        page.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);

    if let Some(pattern) = search.pattern() {
        count_query = count_query.bind(pattern.clone());
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let items: Vec<EmployeeResponse> = data_query
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(EmployeeResponse::from)
        .collect();

    Ok(PagedResult::new(items, total, page))
}

/// Update an employee; a changed email must not collide, and a supplied
/// password is re-hashed.
pub async fn update(pool: &PgPool, id: Uuid, input: &UpdateEmployee) -> Result<Employee, AppError> {
    input.validate()?;
    let existing = find_by_id(pool, id).await?;

    if let Some(ref email) = input.email {
        if find_by_email(pool, email)
            .await?
            .is_some_and(|e| e.id != existing.id)
        {
            return Err(AppError::Conflict(format!(
                "Email '{email}' is already registered"
            )));
        }
    }

    let password_hash = match input.password.as_deref() {
        Some(password) => Some(auth::hash_password(password)?),
        None => None,
    };

    let employee = sqlx::query_as::<_, Employee>(
        r#"
        UPDATE employees SET
            email = COALESCE($2, email),
            password_hash = COALESCE($3, password_hash),
            full_name = COALESCE($4, full_name),
            role = COALESCE($5, role),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(existing.id)
    .bind(&input.email)
    .bind(&password_hash)
    .bind(&input.full_name)
    .bind(input.role)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Email is already registered".to_string())
        }
        _ => AppError::Database(e),
    })?;

    Ok(employee)
}

/// Delete an employee account permanently.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let existing = find_by_id(pool, id).await?;
    sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(existing.id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Deactivate an employee account. Idempotent; the account can no longer
/// log in or refresh tokens.
pub async fn archive(pool: &PgPool, id: Uuid) -> Result<Employee, AppError> {
    set_active(pool, id, false).await
}

/// Reactivate a deactivated employee account. Idempotent.
pub async fn restore(pool: &PgPool, id: Uuid) -> Result<Employee, AppError> {
    set_active(pool, id, true).await
}

async fn set_active(pool: &PgPool, id: Uuid, active: bool) -> Result<Employee, AppError> {
    let existing = find_by_id(pool, id).await?;
    let employee = sqlx::query_as::<_, Employee>(
        "UPDATE employees SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(existing.id)
    .bind(active)
    .fetch_one(pool)
    .await?;
    Ok(employee)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_slot_drives_full_name_column() {
        let filters = EmployeeFilters {
            order_by_full_name: Some(SortDirection::Asc),
            ..Default::default()
        };
        assert_eq!(filters.order_by().to_sql(), "ORDER BY full_name ASC");
    }

    #[test]
    fn search_covers_identity_columns() {
        let filter = TextFilter::new(SEARCH_FIELDS, Some("clerk"));
        assert_eq!(
            filter.condition(1).as_deref(),
            Some("(username ILIKE $1 OR email ILIKE $1 OR full_name ILIKE $1)")
        );
    }
}
