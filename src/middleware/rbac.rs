//! Role-based access control extractors for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::middleware::auth::CurrentEmployee;
use crate::models::employee::EmployeeRole;
use crate::AppState;

/// Extractor that requires the Admin role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentEmployee);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let employee = CurrentEmployee::from_request_parts(parts, state).await?;
        if employee.role != EmployeeRole::Admin {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }
        Ok(RequireAdmin(employee))
    }
}

/// Extractor that requires the Admin or Manager role.
#[derive(Debug, Clone)]
pub struct RequireManager(pub CurrentEmployee);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let employee = CurrentEmployee::from_request_parts(parts, state).await?;
        match employee.role {
            EmployeeRole::Admin | EmployeeRole::Manager => Ok(RequireManager(employee)),
            _ => Err(AppError::Forbidden(
                "Manager or admin access required".to_string(),
            )),
        }
    }
}
