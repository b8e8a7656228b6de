//! Customer routes: CRUD plus archive/restore, open to any authenticated
//! employee.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentEmployee;
use crate::models::customer::{CreateCustomer, Customer, UpdateCustomer};
use crate::models::pagination::{PagedResult, PageQuery};
use crate::services::customer::{self as customer_service, CustomerFilters};
use crate::AppState;

/// GET /api/v1/customers — list customers with search, sorting, pagination.
pub async fn list(
    State(state): State<AppState>,
    _employee: CurrentEmployee,
    Query(page): Query<PageQuery>,
    Query(filters): Query<CustomerFilters>,
) -> Result<Json<ApiResponse<PagedResult<Customer>>>, AppError> {
    let result = customer_service::list(&state.db, &filters, &page).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/customers — create a customer.
pub async fn create(
    State(state): State<AppState>,
    _employee: CurrentEmployee,
    Json(body): Json<CreateCustomer>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let customer = customer_service::create(&state.db, &body).await?;
    Ok(ApiResponse::success(customer))
}

/// GET /api/v1/customers/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _employee: CurrentEmployee,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let customer = customer_service::find_by_id(&state.db, id).await?;
    Ok(ApiResponse::success(customer))
}

/// PUT /api/v1/customers/{id}
pub async fn update(
    State(state): State<AppState>,
    _employee: CurrentEmployee,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCustomer>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let customer = customer_service::update(&state.db, id, &body).await?;
    Ok(ApiResponse::success(customer))
}

/// DELETE /api/v1/customers/{id}
pub async fn delete(
    State(state): State<AppState>,
    _employee: CurrentEmployee,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    customer_service::delete(&state.db, id).await?;
    Ok(ApiResponse::success("Customer deleted"))
}

/// POST /api/v1/customers/{id}/archive
pub async fn archive(
    State(state): State<AppState>,
    _employee: CurrentEmployee,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let customer = customer_service::archive(&state.db, id).await?;
    Ok(ApiResponse::success(customer))
}

/// POST /api/v1/customers/{id}/restore
pub async fn restore(
    State(state): State<AppState>,
    _employee: CurrentEmployee,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Customer>>, AppError> {
    let customer = customer_service::restore(&state.db, id).await?;
    Ok(ApiResponse::success(customer))
}
