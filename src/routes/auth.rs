//! Authentication routes: login, refresh, logout, profile.
//!
//! The access token travels in the response body and is presented as a
//! `Bearer` header by the client. The refresh token never reaches the body:
//! it is set as an HttpOnly cookie scoped to the auth endpoints, so scripts
//! cannot read it and it is only sent back to refresh/logout.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentEmployee;
use crate::models::employee::EmployeeResponse;
use crate::services::auth as auth_service;
use crate::services::auth::TokenPair;
use crate::services::employee as employee_service;
use crate::AppState;

/// Name of the HttpOnly refresh-token cookie.
pub const REFRESH_COOKIE: &str = "stockdesk_refresh";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn refresh_cookie(token: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .path("/api/v1/auth")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .build()
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<TokenPair>>), AppError> {
    let tokens = auth_service::login(
        &state.db,
        &body.username,
        &body.password,
        &state.config.jwt_secret,
        state.config.jwt_access_token_expiry_secs,
        state.config.jwt_refresh_token_expiry_secs,
    )
    .await?;

    let jar = jar.add(refresh_cookie(tokens.refresh_token.clone()));
    Ok((jar, ApiResponse::success(tokens)))
}

/// POST /api/v1/auth/refresh — rotate the token pair from the cookie.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<TokenPair>>), AppError> {
    let current = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(AppError::Unauthorized)?;

    let tokens = auth_service::refresh_token(
        &state.db,
        &current,
        &state.config.jwt_secret,
        state.config.jwt_access_token_expiry_secs,
        state.config.jwt_refresh_token_expiry_secs,
    )
    .await?;

    let jar = jar.add(refresh_cookie(tokens.refresh_token.clone()));
    Ok((jar, ApiResponse::success(tokens)))
}

/// POST /api/v1/auth/logout — clear the refresh cookie.
///
/// Access tokens are stateless and expire on their own; logout only has to
/// drop the cookie, so no authentication is required to call it.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiResponse<&'static str>>) {
    let removal = Cookie::build((REFRESH_COOKIE, "")).path("/api/v1/auth").build();
    let jar = jar.remove(removal);
    (jar, ApiResponse::success("Logged out successfully"))
}

/// GET /api/v1/auth/me — current employee profile
pub async fn me(
    State(state): State<AppState>,
    current: CurrentEmployee,
) -> Result<Json<ApiResponse<EmployeeResponse>>, AppError> {
    let employee = employee_service::find_by_id(&state.db, current.id).await?;
    Ok(ApiResponse::success(EmployeeResponse::from(employee)))
}
