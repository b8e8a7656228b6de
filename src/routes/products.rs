//! Product routes: CRUD, archive/restore, and bulk import from CSV/XLSX.
//! Reads are open to any authenticated employee; mutations need manager+.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentEmployee;
use crate::middleware::rbac::RequireManager;
use crate::models::pagination::{PagedResult, PageQuery};
use crate::models::product::{CreateProduct, Product, UpdateProduct};
use crate::services::product::{
    self as product_service, ImportFormat, ProductColumnMapping, ProductFilters,
    ProductImportResult,
};
use crate::AppState;

/// GET /api/v1/products — list products with search, sorting, pagination.
pub async fn list(
    State(state): State<AppState>,
    _employee: CurrentEmployee,
    Query(page): Query<PageQuery>,
    Query(filters): Query<ProductFilters>,
) -> Result<Json<ApiResponse<PagedResult<Product>>>, AppError> {
    let result = product_service::list(&state.db, &filters, &page).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/products — create a product (manager+).
pub async fn create(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Json(body): Json<CreateProduct>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let product = product_service::create(&state.db, &body).await?;
    Ok(ApiResponse::success(product))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _employee: CurrentEmployee,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let product = product_service::find_by_id(&state.db, id).await?;
    Ok(ApiResponse::success(product))
}

/// PUT /api/v1/products/{id} — update a product (manager+). SKU is immutable.
pub async fn update(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProduct>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let product = product_service::update(&state.db, id, &body).await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /api/v1/products/{id} — delete a product (manager+).
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    product_service::delete(&state.db, id).await?;
    Ok(ApiResponse::success("Product deleted"))
}

/// POST /api/v1/products/{id}/archive — pull a product from the storefront (manager+).
pub async fn archive(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let product = product_service::archive(&state.db, id).await?;
    Ok(ApiResponse::success(product))
}

/// POST /api/v1/products/{id}/restore — put a product back on the storefront (manager+).
pub async fn restore(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let product = product_service::restore(&state.db, id).await?;
    Ok(ApiResponse::success(product))
}

/// POST /api/v1/products/import — import from CSV/XLSX (manager+, multipart).
///
/// Fields: `file` (required) and `mapping` (optional JSON overriding the
/// default column names). Format is detected from the filename extension,
/// defaulting to CSV.
pub async fn import(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ProductImportResult>>, AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut mapping = ProductColumnMapping::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                file_data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?
                        .to_vec(),
                );
            }
            "mapping" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read mapping: {e}")))?;
                mapping = serde_json::from_str(&text)
                    .map_err(|e| AppError::Validation(format!("Invalid mapping JSON: {e}")))?;
            }
            _ => {}
        }
    }

    let data = file_data.ok_or_else(|| {
        AppError::Validation("Missing 'file' field in multipart request".to_string())
    })?;

    let format = filename
        .as_deref()
        .and_then(ImportFormat::from_filename)
        .unwrap_or(ImportFormat::Csv);

    let result = product_service::import_products(&state.db, &data, &mapping, &format).await?;
    Ok(ApiResponse::success(result))
}
