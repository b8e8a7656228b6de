//! Public storefront routes. No authentication: these serve the customer-
//! facing catalog, which only ever exposes active products through the
//! [`StorefrontProduct`] projection.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::models::pagination::{CursorPage, CursorQuery};
use crate::models::product::StorefrontProduct;
use crate::services::product as product_service;
use crate::AppState;

/// GET /api/v1/storefront/products — cursor-paginated product feed,
/// newest first, optionally filtered by a free-text query.
pub async fn feed(
    State(state): State<AppState>,
    Query(params): Query<CursorQuery>,
) -> Result<Json<ApiResponse<CursorPage<StorefrontProduct>>>, AppError> {
    let page = product_service::storefront_feed(&state.db, &params).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/v1/storefront/products/{id} — single active product.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<StorefrontProduct>>, AppError> {
    let product = product_service::storefront_get(&state.db, id).await?;
    Ok(ApiResponse::success(product))
}
