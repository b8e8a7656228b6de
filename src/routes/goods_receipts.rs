//! Goods receipt routes: reads for any authenticated employee, mutations
//! for managers and admins.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentEmployee;
use crate::middleware::rbac::RequireManager;
use crate::models::goods_receipt::{CreateGoodsReceipt, GoodsReceipt, UpdateGoodsReceipt};
use crate::models::pagination::{PagedResult, PageQuery};
use crate::services::goods_receipt::{self as receipt_service, GoodsReceiptFilters};
use crate::AppState;

/// GET /api/v1/goods-receipts — list receipts, optionally narrowed to one
/// supplier or warehouse.
pub async fn list(
    State(state): State<AppState>,
    _employee: CurrentEmployee,
    Query(page): Query<PageQuery>,
    Query(filters): Query<GoodsReceiptFilters>,
) -> Result<Json<ApiResponse<PagedResult<GoodsReceipt>>>, AppError> {
    let result = receipt_service::list(&state.db, &filters, &page).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/goods-receipts — record a goods receipt (manager+).
pub async fn create(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Json(body): Json<CreateGoodsReceipt>,
) -> Result<Json<ApiResponse<GoodsReceipt>>, AppError> {
    let receipt = receipt_service::create(&state.db, &body).await?;
    Ok(ApiResponse::success(receipt))
}

/// GET /api/v1/goods-receipts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _employee: CurrentEmployee,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<GoodsReceipt>>, AppError> {
    let receipt = receipt_service::find_by_id(&state.db, id).await?;
    Ok(ApiResponse::success(receipt))
}

/// PUT /api/v1/goods-receipts/{id} — update a receipt (manager+).
pub async fn update(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateGoodsReceipt>,
) -> Result<Json<ApiResponse<GoodsReceipt>>, AppError> {
    let receipt = receipt_service::update(&state.db, id, &body).await?;
    Ok(ApiResponse::success(receipt))
}

/// DELETE /api/v1/goods-receipts/{id} — delete a receipt (manager+).
pub async fn delete(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    receipt_service::delete(&state.db, id).await?;
    Ok(ApiResponse::success("Goods receipt deleted"))
}

/// POST /api/v1/goods-receipts/{id}/archive — archive a receipt (manager+).
pub async fn archive(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<GoodsReceipt>>, AppError> {
    let receipt = receipt_service::archive(&state.db, id).await?;
    Ok(ApiResponse::success(receipt))
}

/// POST /api/v1/goods-receipts/{id}/restore — restore a receipt (manager+).
pub async fn restore(
    State(state): State<AppState>,
    RequireManager(_manager): RequireManager,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<GoodsReceipt>>, AppError> {
    let receipt = receipt_service::restore(&state.db, id).await?;
    Ok(ApiResponse::success(receipt))
}
