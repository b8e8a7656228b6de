//! Product catalog service: validated CRUD, spreadsheet/CSV import with
//! SKU upsert, and the public storefront cursor feed.

use calamine::{open_workbook_from_rs, Reader, Xlsx};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::io::Cursor;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::filter::TextFilter;
use crate::models::pagination::{CursorPage, CursorQuery, PageQuery, PagedResult};
use crate::models::product::{
    is_valid_sku, CreateProduct, Product, StorefrontProduct, UpdateProduct,
};
use crate::models::sorting::{de_opt_direction, OrderBy, SortDirection};

const SEARCH_FIELDS: &[&str] = &["sku", "name", "description"];

/// Storefront slice size; the feed has no client-controlled page size.
const STOREFRONT_PAGE_SIZE: usize = 10;

/// Filter and sort parameters for the back-office product list.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilters {
    pub query: Option<String>,
    #[serde(default)]
    pub include_archived: bool,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_sku: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_name: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_price: Option<SortDirection>,
    #[serde(default, deserialize_with = "de_opt_direction")]
    pub order_by_created_at: Option<SortDirection>,
}

impl ProductFilters {
    pub fn order_by(&self) -> OrderBy {
        OrderBy::from_slots(
            &[
                ("sku", self.order_by_sku),
                ("name", self.order_by_name),
                ("price", self.order_by_price),
                ("created_at", self.order_by_created_at),
            ],
            ("created_at", SortDirection::Desc),
        )
    }
}

/// Result of a product file import.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImportResult {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<ImportRowError>,
}

/// Individual import row failure.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRowError {
    pub row: usize,
    pub sku: Option<String>,
    pub message: String,
}

/// Configurable column-to-field mapping for product imports.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductColumnMapping {
    #[serde(default = "default_sku_column")]
    pub sku_column: String,
    #[serde(default = "default_name_column")]
    pub name_column: String,
    #[serde(default = "default_description_column")]
    pub description_column: String,
    #[serde(default = "default_price_column")]
    pub price_column: String,
    #[serde(default = "default_unit_column")]
    pub unit_column: String,
}

fn default_sku_column() -> String {
    "SKU".to_string()
}
fn default_name_column() -> String {
    "Name".to_string()
}
fn default_description_column() -> String {
    "Description".to_string()
}
fn default_price_column() -> String {
    "Price".to_string()
}
fn default_unit_column() -> String {
    "Unit".to_string()
}

impl Default for ProductColumnMapping {
    fn default() -> Self {
        Self {
            sku_column: default_sku_column(),
            name_column: default_name_column(),
            description_column: default_description_column(),
            price_column: default_price_column(),
            unit_column: default_unit_column(),
        }
    }
}

/// Import file format.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportFormat {
    Csv,
    Xlsx,
}

impl ImportFormat {
    /// Detect format from filename extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".csv") {
            Some(Self::Csv)
        } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            Some(Self::Xlsx)
        } else {
            None
        }
    }
}

/// Create a product; the SKU must be unused.
pub async fn create(pool: &PgPool, input: &CreateProduct) -> Result<Product, AppError> {
    input.validate()?;

    if find_by_sku(pool, &input.sku).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "SKU '{}' already exists",
            input.sku
        )));
    }

    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (sku, name, description, price, unit)
        VALUES ($1, $2, $3, $4, COALESCE($5, 'pcs'))
        RETURNING *
        "#,
    )
    .bind(&input.sku)
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.price)
    .bind(&input.unit)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(format!("SKU '{}' already exists", input.sku))
        }
        _ => AppError::Database(e),
    })?;

    Ok(product)
}

/// Find product by ID.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Product, AppError> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// Find product by SKU.
pub async fn find_by_sku(pool: &PgPool, sku: &str) -> Result<Option<Product>, AppError> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE sku = $1")
        .bind(sku)
        .fetch_optional(pool)
        .await?;
    Ok(product)
}

/// List products with free-text search, sorting, and pagination.
pub async fn list(
    pool: &PgPool,
    filters: &ProductFilters,
    page: &PageQuery,
) -> Result<PagedResult<Product>, AppError> {
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

    let count_sql = format!("SELECT COUNT(*) FROM products {where_clause}");
    let data_sql = format!(
        "SELECT * FROM products {where_clause} {order_by} LIMIT {} OFFSET {}",
        page.limit(),
        page.offset()
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut data_query = sqlx::query_as::<_, Product>(&data_sql);

    if let Some(pattern) = search.pattern() {
        count_query = count_query.bind(pattern.clone());
        data_query = data_query.bind(pattern);
    }

    let total = count_query.fetch_one(pool).await?;
    let items = data_query.fetch_all(pool).await?;

    Ok(PagedResult::new(items, total, page))
}

/// Update a product. The SKU is immutable once assigned.
pub async fn update(pool: &PgPool, id: Uuid, input: &UpdateProduct) -> Result<Product, AppError> {
    input.validate()?;
    let existing = find_by_id(pool, id).await?;

    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            price = COALESCE($4, price),
            unit = COALESCE($5, unit),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(existing.id)
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.price)
    .bind(&input.unit)
    .fetch_one(pool)
    .await?;

    Ok(product)
}

/// Delete a product permanently.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let existing = find_by_id(pool, id).await?;
    sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(existing.id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Mark a product archived, hiding it from the storefront. Idempotent.
pub async fn archive(pool: &PgPool, id: Uuid) -> Result<Product, AppError> {
    set_archived(pool, id, true).await
}

/// Bring an archived product back. Idempotent.
pub async fn restore(pool: &PgPool, id: Uuid) -> Result<Product, AppError> {
    set_archived(pool, id, false).await
}

async fn set_archived(pool: &PgPool, id: Uuid, archived: bool) -> Result<Product, AppError> {
    let existing = find_by_id(pool, id).await?;
    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET is_archived = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(existing.id)
    .bind(archived)
    .fetch_one(pool)
    .await?;
    Ok(product)
}

/// One slice of the public storefront feed: active products, newest first.
///
/// Fetches one row past the page size; the slice and cursor computation live
/// in [`CursorPage::from_rows`]. The cursor predicate compares `(created_at,
/// id)` row-wise against the cursor row, so rows created in the same instant
/// cannot be skipped or repeated across slices. A cursor pointing at a
/// deleted row matches nothing and yields an empty page.
pub async fn storefront_feed(
    pool: &PgPool,
    params: &CursorQuery,
) -> Result<CursorPage<StorefrontProduct>, AppError> {
    let mut conditions: Vec<String> = vec!["is_archived = FALSE".to_string()];
    let mut param_index = 0usize;

    let search = TextFilter::new(SEARCH_FIELDS, params.query.as_deref());
    if search.is_active() {
        param_index += 1;
    }
    if let Some(condition) = search.condition(param_index) {
        conditions.push(condition);
    }

    if params.cursor.is_some() {
        param_index += 1;
        conditions.push(format!(
            "(created_at, id) < (SELECT created_at, id FROM products WHERE id = ${param_index})"
        ));
    }

    let sql = format!(
        "SELECT id, sku, name, description, price, unit, created_at \
         FROM products WHERE {} ORDER BY created_at DESC, id DESC LIMIT {}",
        conditions.join(" AND "),
        STOREFRONT_PAGE_SIZE + 1
    );

    let mut query = sqlx::query_as::<_, StorefrontProduct>(&sql);
    if let Some(pattern) = search.pattern() {
        query = query.bind(pattern);
    }
    if let Some(cursor) = params.cursor {
        query = query.bind(cursor);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(CursorPage::from_rows(rows, STOREFRONT_PAGE_SIZE, |p| p.id))
}

/// Fetch a single active product for the storefront.
pub async fn storefront_get(pool: &PgPool, id: Uuid) -> Result<StorefrontProduct, AppError> {
    sqlx::query_as::<_, StorefrontProduct>(
        "SELECT id, sku, name, description, price, unit, created_at \
         FROM products WHERE id = $1 AND is_archived = FALSE",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// Parse and import products from a CSV or XLSX file, upserting by SKU.
///
/// Rows without a SKU are skipped; rows with an invalid SKU or a
/// non-numeric price are reported per-row without aborting the import.
pub async fn import_products(
    pool: &PgPool,
    data: &[u8],
    mapping: &ProductColumnMapping,
    format: &ImportFormat,
) -> Result<ProductImportResult, AppError> {
    let rows = match format {
        ImportFormat::Csv => parse_csv_rows(data)?,
        ImportFormat::Xlsx => parse_xlsx_rows(data)?,
    };

    let mut created = 0usize;
    let mut updated = 0usize;
    let mut skipped = 0usize;
    let mut errors = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let get_field = |col: &str| -> Option<String> {
            row.get(col)
                .filter(|v| !v.trim().is_empty())
                .map(|v| v.trim().to_string())
        };

        let sku = match get_field(&mapping.sku_column) {
            Some(sku) => sku.to_uppercase(),
            None => {
                skipped += 1;
                continue;
            }
        };
        if !is_valid_sku(&sku) {
            errors.push(ImportRowError {
                row: i + 2,
                sku: Some(sku),
                message: "Invalid SKU format".to_string(),
            });
            continue;
        }

        let name = get_field(&mapping.name_column).unwrap_or_else(|| sku.clone());
        let description = get_field(&mapping.description_column);
        let price = match get_field(&mapping.price_column) {
            Some(raw) => match parse_price(&raw) {
                Ok(price) => price,
                Err(message) => {
                    errors.push(ImportRowError {
                        row: i + 2,
                        sku: Some(sku),
                        message,
                    });
                    continue;
                }
            },
            None => 0.0,
        };
        let unit = get_field(&mapping.unit_column).unwrap_or_else(|| "pcs".to_string());

        let result = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (sku, name, description, price, unit)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (sku) DO UPDATE SET
                name = EXCLUDED.name,
                description = COALESCE(EXCLUDED.description, products.description),
                price = EXCLUDED.price,
                unit = EXCLUDED.unit,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(&sku)
        .bind(&name)
        .bind(&description)
        .bind(price)
        .bind(&unit)
        .fetch_one(pool)
        .await;

        match result {
            Ok(product) => {
                if product.created_at == product.updated_at {
                    created += 1;
                } else {
                    updated += 1;
                }
            }
            Err(e) => errors.push(ImportRowError {
                row: i + 2,
                sku: Some(sku),
                message: e.to_string(),
            }),
        }
    }

    Ok(ProductImportResult {
        total: rows.len(),
        created,
        updated,
        skipped,
        errors,
    })
}

/// Parse a price cell, accepting a comma decimal separator.
fn parse_price(raw: &str) -> Result<f64, String> {
    let normalized = raw.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(price) if price >= 0.0 => Ok(price),
        Ok(_) => Err(format!("Negative price '{raw}'")),
        Err(_) => Err(format!("Invalid price '{raw}'")),
    }
}

/// Make a header row usable as map keys: blank headers become positional
/// `Column_N` names and repeats get a numeric suffix (`Name`, `Name_2`, …).
fn dedupe_headers(raw: &[String]) -> Vec<String> {
    let mut seen: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut headers = Vec::with_capacity(raw.len());
    for (i, header) in raw.iter().enumerate() {
        let trimmed = header.trim();
        let base = if trimmed.is_empty() {
            format!("Column_{}", i + 1)
        } else {
            trimmed.to_string()
        };
        let count = seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            headers.push(base);
        } else {
            headers.push(format!("{base}_{count}"));
        }
    }
    headers
}

/// Parse CSV data into a list of header→value maps.
fn parse_csv_rows(
    data: &[u8],
) -> Result<Vec<std::collections::HashMap<String, String>>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let raw_headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::Validation(format!("Invalid CSV headers: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let headers = dedupe_headers(&raw_headers);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AppError::Validation(format!("CSV parse error: {e}")))?;
        let mut map = std::collections::HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            if let Some(value) = record.get(i) {
                map.insert(header.clone(), value.to_string());
            }
        }
        rows.push(map);
    }
    Ok(rows)
}

/// Parse XLSX data into a list of header→value maps.
fn parse_xlsx_rows(
    data: &[u8],
) -> Result<Vec<std::collections::HashMap<String, String>>, AppError> {
    let cursor = Cursor::new(data);
    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor)
        .map_err(|e| AppError::Validation(format!("Invalid XLSX file: {e}")))?;

    // Use first sheet
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::Validation("XLSX file has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AppError::Validation(format!("Failed to read sheet '{sheet_name}': {e}")))?;

    let mut row_iter = range.rows();

    // First row is headers
    let header_row = row_iter
        .next()
        .ok_or_else(|| AppError::Validation("XLSX sheet is empty".to_string()))?;

    let raw_headers: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();
    let headers = dedupe_headers(&raw_headers);

    let mut rows = Vec::new();
    for row in row_iter {
        let mut map = std::collections::HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            let value = row.get(i).map(|cell| cell.to_string()).unwrap_or_default();
            map.insert(header.clone(), value);
        }
        rows.push(map);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_format_detection() {
        assert_eq!(ImportFormat::from_filename("goods.csv"), Some(ImportFormat::Csv));
        assert_eq!(ImportFormat::from_filename("goods.xlsx"), Some(ImportFormat::Xlsx));
        assert_eq!(ImportFormat::from_filename("goods.xls"), Some(ImportFormat::Xlsx));
        assert_eq!(ImportFormat::from_filename("GOODS.XLSX"), Some(ImportFormat::Xlsx));
        assert_eq!(ImportFormat::from_filename("goods.json"), None);
    }

    #[test]
    fn header_dedupe_suffixes_repeats() {
        let raw: Vec<String> = ["SKU", "Name", "Name", "Name", "Price"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            dedupe_headers(&raw),
            vec!["SKU", "Name", "Name_2", "Name_3", "Price"]
        );
    }

    #[test]
    fn header_dedupe_names_blank_columns_by_position() {
        let raw: Vec<String> = ["SKU", "", "  ", "Price"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            dedupe_headers(&raw),
            vec!["SKU", "Column_2", "Column_3", "Price"]
        );
    }

    #[test]
    fn csv_parsing_applies_deduped_headers() {
        let csv_data = b"SKU,Name,Name\nWID-1,Widget,Gadget";
        let rows = parse_csv_rows(csv_data).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["SKU"], "WID-1");
        assert_eq!(rows[0]["Name"], "Widget");
        assert_eq!(rows[0]["Name_2"], "Gadget");
    }

    #[test]
    fn price_parsing_accepts_comma_decimals() {
        assert_eq!(parse_price("9.50"), Ok(9.5));
        assert_eq!(parse_price(" 12,75 "), Ok(12.75));
        assert_eq!(parse_price("0"), Ok(0.0));
        assert!(parse_price("-1").is_err());
        assert!(parse_price("twelve").is_err());
    }

    #[test]
    fn default_column_mapping() {
        let mapping = ProductColumnMapping::default();
        assert_eq!(mapping.sku_column, "SKU");
        assert_eq!(mapping.price_column, "Price");
    }

    #[test]
    fn mapping_overrides_deserialize_from_partial_json() {
        let mapping: ProductColumnMapping =
            serde_json::from_str(r#"{"skuColumn":"Artikelnummer"}"#).unwrap();
        assert_eq!(mapping.sku_column, "Artikelnummer");
        assert_eq!(mapping.name_column, "Name");
    }

    #[test]
    fn price_slot_drives_price_column() {
        let filters = ProductFilters {
            order_by_price: Some(SortDirection::Asc),
            ..Default::default()
        };
        assert_eq!(filters.order_by().to_sql(), "ORDER BY price ASC");
    }
}
