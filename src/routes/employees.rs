//! Employee administration routes. Every operation here is admin-only;
//! non-admin employees manage their own session through the auth routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireAdmin;
use crate::models::employee::{CreateEmployee, EmployeeResponse, UpdateEmployee};
use crate::models::pagination::{PagedResult, PageQuery};
use crate::services::employee::{self as employee_service, EmployeeFilters};
use crate::AppState;

/// GET /api/v1/employees — list employees with search, sorting, pagination.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(page): Query<PageQuery>,
    Query(filters): Query<EmployeeFilters>,
) -> Result<Json<ApiResponse<PagedResult<EmployeeResponse>>>, AppError> {
    let result = employee_service::list(&state.db, &filters, &page).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/employees — create an employee account.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CreateEmployee>,
) -> Result<Json<ApiResponse<EmployeeResponse>>, AppError> {
    let employee = employee_service::create(&state.db, &body).await?;
    Ok(ApiResponse::success(EmployeeResponse::from(employee)))
}

/// GET /api/v1/employees/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EmployeeResponse>>, AppError> {
    let employee = employee_service::find_by_id(&state.db, id).await?;
    Ok(ApiResponse::success(EmployeeResponse::from(employee)))
}

/// PUT /api/v1/employees/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateEmployee>,
) -> Result<Json<ApiResponse<EmployeeResponse>>, AppError> {
    let employee = employee_service::update(&state.db, id, &body).await?;
    Ok(ApiResponse::success(EmployeeResponse::from(employee)))
}

/// DELETE /api/v1/employees/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    employee_service::delete(&state.db, id).await?;
    Ok(ApiResponse::success("Employee deleted"))
}

/// POST /api/v1/employees/{id}/archive — deactivate an account.
pub async fn archive(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EmployeeResponse>>, AppError> {
    let employee = employee_service::archive(&state.db, id).await?;
    Ok(ApiResponse::success(EmployeeResponse::from(employee)))
}

/// POST /api/v1/employees/{id}/restore — reactivate an account.
pub async fn restore(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<EmployeeResponse>>, AppError> {
    let employee = employee_service::restore(&state.db, id).await?;
    Ok(ApiResponse::success(EmployeeResponse::from(employee)))
}
