//! Warehouse routes: reads for any authenticated employee, mutations for
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
use crate::models::warehouse::{CreateWarehouse, UpdateWarehouse, Warehouse};
use crate::services::warehouse::{self as warehouse_service, WarehouseFilters};
use crate::AppState;

/// GET /api/v1/warehouses — list warehouses with search, sorting, pagination.
pub async fn list(
    State(state): State<AppState>,
    _employee: CurrentEmployee,
    Query(page): Query<PageQuery>,
    Query(filters): Query<WarehouseFilters>,
) -> Result<Json<ApiResponse<PagedResult<Warehouse>>>, AppError> {
    let result = warehouse_service::list(&state.db, &filters, &page).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/warehouses — create a warehouse (manager+).
pub async fn create(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Json(body): Json<CreateWarehouse>,
) -> Result<Json<ApiResponse<Warehouse>>, AppError> {
    let warehouse = warehouse_service::create(&state.db, &body).await?;
    Ok(ApiResponse::success(warehouse))
}

/// GET /api/v1/warehouses/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _employee: CurrentEmployee,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Warehouse>>, AppError> {
    let warehouse = warehouse_service::find_by_id(&state.db, id).await?;
    Ok(ApiResponse::success(warehouse))
}

/// PUT /api/v1/warehouses/{id} — update a warehouse (manager+).
pub async fn update(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateWarehouse>,
) -> Result<Json<ApiResponse<Warehouse>>, AppError> {
    let warehouse = warehouse_service::update(&state.db, id, &body).await?;
    Ok(ApiResponse::success(warehouse))
}

/// DELETE /api/v1/warehouses/{id} — delete a warehouse (manager+).
///
/// Rejected with a conflict while goods receipts still reference it.
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    warehouse_service::delete(&state.db, id).await?;
    Ok(ApiResponse::success("Warehouse deleted"))
}

/// POST /api/v1/warehouses/{id}/archive — archive a warehouse (manager+).
pub async fn archive(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Warehouse>>, AppError> {
    let warehouse = warehouse_service::archive(&state.db, id).await?;
    Ok(ApiResponse::success(warehouse))
}

/// POST /api/v1/warehouses/{id}/restore — restore a warehouse (manager+).
pub async fn restore(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Warehouse>>, AppError> {
    let warehouse = warehouse_service::restore(&state.db, id).await?;
    Ok(ApiResponse::success(warehouse))
}
