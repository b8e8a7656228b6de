//! Supplier routes: reads for any authenticated employee, mutations for
//! managers and admins.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentEmployee;
use crate::middleware::rbac::RequireManager;
use crate::models::pagination::{PagedResult, PageQuery};
use crate::models::supplier::{CreateSupplier, Supplier, UpdateSupplier};
use crate::services::supplier::{self as supplier_service, SupplierFilters};
use crate::AppState;

/// GET /api/v1/suppliers — list suppliers with search, sorting, pagination.
pub async fn list(
    State(state): State<AppState>,
    _employee: CurrentEmployee,
    Query(page): Query<PageQuery>,
    Query(filters): Query<SupplierFilters>,
) -> Result<Json<ApiResponse<PagedResult<Supplier>>>, AppError> {
    let result = supplier_service::list(&state.db, &filters, &page).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/suppliers — create a supplier (manager+).
pub async fn create(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Json(body): Json<CreateSupplier>,
) -> Result<Json<ApiResponse<Supplier>>, AppError> {
    let supplier = supplier_service::create(&state.db, &body).await?;
    Ok(ApiResponse::success(supplier))
}

/// GET /api/v1/suppliers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _employee: CurrentEmployee,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Supplier>>, AppError> {
    let supplier = supplier_service::find_by_id(&state.db, id).await?;
    Ok(ApiResponse::success(supplier))
}

/// PUT /api/v1/suppliers/{id} — update a supplier (manager+).
pub async fn update(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateSupplier>,
) -> Result<Json<ApiResponse<Supplier>>, AppError> {
    let supplier = supplier_service::update(&state.db, id, &body).await?;
    Ok(ApiResponse::success(supplier))
}

/// DELETE /api/v1/suppliers/{id} — delete a supplier (manager+).
///
/// Rejected with a conflict while goods receipts still reference it.
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    supplier_service::delete(&state.db, id).await?;
    Ok(ApiResponse::success("Supplier deleted"))
}

/// POST /api/v1/suppliers/{id}/archive — archive a supplier (manager+).
pub async fn archive(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Supplier>>, AppError> {
    let supplier = supplier_service::archive(&state.db, id).await?;
    Ok(ApiResponse::success(supplier))
}

/// POST /api/v1/suppliers/{id}/restore — restore a supplier (manager+).
pub async fn restore(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Supplier>>, AppError> {
    let supplier = supplier_service::restore(&state.db, id).await?;
    Ok(ApiResponse::success(supplier))
}
