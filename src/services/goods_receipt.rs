//! Goods receipt service: validated CRUD against referenced suppliers and
//! warehouses, archiving, and paged listing.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::filter::TextFilter;
use crate::models::goods_receipt::{CreateGoodsReceipt, GoodsReceipt, UpdateGoodsReceipt};
use crate::models::pagination::{PageQuery, PagedResult};
use crate::models::sorting::{de_opt_direction, OrderBy, SortDirection};
use crate::services::{supplier, warehouse};

const SEARCH_FIELDS: &[&str] = &["reference", "note"];

/// Filter and sort parameters for listing goods receipts.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoodsReceiptFilters {
    pub query: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    #[serde(default)]
    pub include_archived: bool,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_reference: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_received_at: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_created_at: Option<SortDirection>,
}

impl GoodsReceiptFilters {
    pub fn order_by(&self) -> OrderBy {
        OrderBy::from_slots(
            &[
                ("reference", self.order_by_reference),
                ("received_at", self.order_by_received_at),
                ("created_at", self.order_by_created_at),
            ],
            ("created_at", SortDirection::Desc),
        )
    }
}

/// Create a goods receipt. The supplier and warehouse must exist and the
/// reference must be unused; all three lookups are independent and run
/// concurrently.
pub async fn create(pool: &PgPool, input: &CreateGoodsReceipt) -> Result<GoodsReceipt, AppError> {
    input.validate()?;

    let (_, _, by_reference) = tokio::try_join!(
        supplier::find_by_id(pool, input.supplier_id),
        warehouse::find_by_id(pool, input.warehouse_id),
        find_by_reference(pool, &input.reference)
    )?;
    if by_reference.is_some() {
        return Err(AppError::Conflict(format!(
            "Receipt reference '{}' already exists",
            input.reference
        )));
    }

    let items = serde_json::to_value(&input.items).unwrap_or_default();

    let receipt = sqlx::query_as::<_, GoodsReceipt>(
        r#"
        INSERT INTO goods_receipts (reference, supplier_id, warehouse_id, received_at, note, items)
        VALUES ($1, $2, $3, COALESCE($4, NOW()), $5, $6)
        RETURNING *
        "#,
    )
    .bind(&input.reference)
    .bind(input.supplier_id)
    .bind(input.warehouse_id)
    .bind(input.received_at)
    .bind(&input.note)
    .bind(&items)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(format!(
                "Receipt reference '{}' already exists",
                input.reference
            ))
        }
        _ => AppError::Database(e),
    })?;

    Ok(receipt)
}

/// Find goods receipt by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<GoodsReceipt, AppError> {
    sqlx::query_as::<_, GoodsReceipt>("SELECT * FROM goods_receipts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Goods receipt not found".to_string()))
}

/// Find goods receipt by reference.
pub async fn find_by_reference(
    pool: &PgPool,
    reference: &str,
) -> Result<Option<GoodsReceipt>, AppError> {
    let receipt =
        sqlx::query_as::<_, GoodsReceipt>("SELECT * FROM goods_receipts WHERE reference = $1")
            .bind(reference)
            .fetch_optional(pool)
            .await?;
    Ok(receipt)
}

/// List goods receipts, optionally narrowed to one supplier or warehouse.
pub async fn list(
    pool: &PgPool,
    filters: &GoodsReceiptFilters,
    page: &PageQuery,
) -> Result<PagedResult<GoodsReceipt>, AppError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0usize;

    if !filters.include_archived {
        conditions.push("is_archived = FALSE".to_string());
    }
    if filters.supplier_id.is_some() {
        param_index += 1;
        conditions.push(format!("supplier_id = ${param_index}"));
    }
    if filters.warehouse_id.is_some() {
        param_index += 1;
        conditions.push(format!("warehouse_id = ${param_index}"));
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

    let count_sql = format!("SELECT COUNT(*) FROM goods_receipts {where_clause}");
    let data_sql = format!(
        "SELECT * FROM goods_receipts {where_clause} {order_by} LIMIT {} OFFSET {}",
        page.limit(),
        page.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, GoodsReceipt>(&data_sql);

    // Bind parameters in the same order for both queries
    macro_rules! bind_both {
        ($val:expr) => {
            count_query = count_query.bind($val);
            data_query = data_query.bind($val);
        };
    }

    if let Some(supplier_id) = filters.supplier_id {
        bind_both!(supplier_id);
    }
    if let Some(warehouse_id) = filters.warehouse_id {
        bind_both!(warehouse_id);
    }
    if let Some(pattern) = search.pattern() {
        count_query = count_query.bind(pattern.clone());
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, page))
}

/// Update a goods receipt; a changed reference must stay unique.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    input: &UpdateGoodsReceipt,
) -> Result<GoodsReceipt, AppError> {
    input.validate()?;
    let existing = find_by_id(pool, id).await?;

    if let Some(ref reference) = input.reference {
        if find_by_reference(pool, reference)
            .await?
            .is_some_and(|r| r.id != existing.id)
        {
            return Err(AppError::Conflict(format!(
                "Receipt reference '{reference}' already exists"
            )));
        }
    }

    let receipt = sqlx::query_as::<_, GoodsReceipt>(
        r#"
        UPDATE goods_receipts SET
            reference = COALESCE($2, reference),
            received_at = COALESCE($3, received_at),
            note = COALESCE($4, note),
            items = COALESCE($5, items),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(existing.id)
    .bind(&input.reference)
    .bind(input.received_at)
    .bind(&input.note)
    .bind(
        input
            .items
            .as_ref()
            .map(|v| serde_json::to_value(v).unwrap_or_default()),
    )
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Receipt reference is already taken".to_string())
        }
        _ => AppError::Database(e),
    })?;

    Ok(receipt)
}

/// Delete a goods receipt permanently.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let existing = find_by_id(pool, id).await?;
    sqlx::query("DELETE FROM goods_receipts WHERE id = $1")
        .bind(existing.id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Mark a goods receipt archived. Idempotent.
pub async fn archive(pool: &PgPool, id: Uuid) -> Result<GoodsReceipt, AppError> {
    set_archived(pool, id, true).await
}

/// Bring an archived goods receipt back. Idempotent.
pub async fn restore(pool: &PgPool, id: Uuid) -> Result<GoodsReceipt, AppError> {
    set_archived(pool, id, false).await
}

async fn set_archived(pool: &PgPool, id: Uuid, archived: bool) -> Result<GoodsReceipt, AppError> {
    let existing = find_by_id(pool, id).await?;
    let receipt = sqlx::query_as::<_, GoodsReceipt>(
        "UPDATE goods_receipts SET is_archived = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(existing.id)
    .bind(archived)
    .fetch_one(pool)
    .await?;
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn received_at_slot_drives_received_at_column() {
        let filters = GoodsReceiptFilters {
            order_by_received_at: Some(SortDirection::Asc),
            ..Default::default()
        };
        assert_eq!(filters.order_by().to_sql(), "ORDER BY received_at ASC");
    }

    #[test]
    fn search_covers_reference_and_note() {
        let filter = TextFilter::new(SEARCH_FIELDS, Some("GR-2024"));
        assert_eq!(
            filter.condition(3).as_deref(),
            Some("(reference ILIKE $3 OR note ILIKE $3)")
        );
    }
}
