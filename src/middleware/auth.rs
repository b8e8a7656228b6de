//! JWT authentication extractor for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::employee::EmployeeRole;
use crate::services::auth as auth_service;
use crate::AppState;

/// Authenticated employee extracted from a JWT Bearer token.
///
/// Use as an Axum extractor in handlers that require authentication:
/// ```ignore
/// async fn handler(current: CurrentEmployee) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentEmployee {
    pub id: Uuid,
    pub username: String,
    pub role: EmployeeRole,
}

impl FromRequestParts<AppState> for CurrentEmployee {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let claims = auth_service::validate_token(token, &state.config.jwt_secret)?;

        // Refresh tokens only work against the refresh endpoint.
        if claims.token_type != "access" {
            return Err(AppError::Unauthorized);
        }

        let employee_id: Uuid = claims
            .employee_id
            .parse()
            .map_err(|_| AppError::Unauthorized)?;

        let role: EmployeeRole =
            serde_json::from_str(&format!("\"{}\"", claims.role)).map_err(|_| {
                AppError::Internal(format!("Invalid role in token: {}", claims.role))
            })?;

        Ok(CurrentEmployee {
            id: employee_id,
            username: claims.sub,
            role,
        })
    }
}
