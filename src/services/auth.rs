//! Authentication service: password hashing, JWT issuance, login, refresh.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::employee::Employee;

/// Maximum failed login attempts before account lockout.
const MAX_FAILED_ATTEMPTS: i32 = 3;

/// Lockout duration in minutes after exceeding max failed attempts.
const LOCKOUT_DURATION_MINUTES: i64 = 30;

/// JWT claims embedded in access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub employee_id: String,
    pub role: String,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token pair issued on successful login or refresh. The refresh token
/// never appears in a response body; it travels in an HttpOnly cookie.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Hash a plaintext password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generate a JWT token pair (access + refresh).
pub fn generate_tokens(
    employee: &Employee,
    jwt_secret: &str,
    access_expiry_secs: i64,
    refresh_expiry_secs: i64,
) -> Result<TokenPair, AppError> {
    let now = Utc::now();
    let encoding_key = EncodingKey::from_secret(jwt_secret.as_bytes());

    let access_claims = Claims {
        sub: employee.username.clone(),
        employee_id: employee.id.to_string(),
        role: serde_json::to_string(&employee.role)
            .unwrap_or_default()
            .trim_matches('"')
            .to_string(),
        token_type: "access".to_string(),
        exp: (now + Duration::seconds(access_expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    let refresh_claims = Claims {
        sub: employee.username.clone(),
        employee_id: employee.id.to_string(),
        role: access_claims.role.clone(),
        token_type: "refresh".to_string(),
        exp: (now + Duration::seconds(refresh_expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    let access_token = jsonwebtoken::encode(&Header::default(), &access_claims, &encoding_key)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    let refresh_token = jsonwebtoken::encode(&Header::default(), &refresh_claims, &encoding_key)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: access_expiry_secs,
    })
}

/// Validate a JWT and return the claims.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let validation = Validation::default();

    jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
}

/// Authenticate an employee by username and password, returning a token pair.
///
/// Three consecutive failures lock the account for thirty minutes; inactive
/// accounts and locked accounts are rejected without distinguishing detail.
pub async fn login(
    pool: &PgPool,
    username: &str,
    password: &str,
    jwt_secret: &str,
    access_expiry_secs: i64,
    refresh_expiry_secs: i64,
) -> Result<TokenPair, AppError> {
    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Check account lockout
    if let Some(locked_until) = employee.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Unauthorized);
        }
    }

    // Check active status
    if !employee.is_active {
        return Err(AppError::Unauthorized);
    }

    // Verify password
    if !verify_password(password, &employee.password_hash)? {
        let new_attempts = employee.failed_login_attempts + 1;
        if new_attempts >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + Duration::minutes(LOCKOUT_DURATION_MINUTES);
            sqlx::query(
                "UPDATE employees SET failed_login_attempts = $1, locked_until = $2 WHERE id = $3",
            )
            .bind(new_attempts)
            .bind(lock_until)
            .bind(employee.id)
            .execute(pool)
            .await?;
        } else {
            sqlx::query("UPDATE employees SET failed_login_attempts = $1 WHERE id = $2")
                .bind(new_attempts)
                .bind(employee.id)
                .execute(pool)
                .await?;
        }
        return Err(AppError::Unauthorized);
    }

    // Reset failed attempts on successful login
    sqlx::query(
        "UPDATE employees SET failed_login_attempts = 0, locked_until = NULL, last_login = NOW() \
         WHERE id = $1",
    )
    .bind(employee.id)
    .execute(pool)
    .await?;

    generate_tokens(
        &employee,
        jwt_secret,
        access_expiry_secs,
        refresh_expiry_secs,
    )
}

/// Rotate a token pair from a valid refresh token.
pub async fn refresh_token(
    pool: &PgPool,
    refresh_token_str: &str,
    jwt_secret: &str,
    access_expiry_secs: i64,
    refresh_expiry_secs: i64,
) -> Result<TokenPair, AppError> {
    let claims = validate_token(refresh_token_str, jwt_secret)?;

    if claims.token_type != "refresh" {
        return Err(AppError::Unauthorized);
    }

    let employee_id: Uuid = claims
        .employee_id
        .parse()
        .map_err(|_| AppError::Unauthorized)?;

    let employee =
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1 AND is_active = true")
            .bind(employee_id)
            .fetch_optional(pool)
            .await?
            .ok_or(AppError::Unauthorized)?;

    generate_tokens(
        &employee,
        jwt_secret,
        access_expiry_secs,
        refresh_expiry_secs,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::EmployeeRole;

    fn sample_employee(role: EmployeeRole) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            username: "clerk".to_string(),
            email: "clerk@shop.test".to_string(),
            password_hash: "hash".to_string(),
            full_name: "Clerk".to_string(),
            role,
            is_active: true,
            failed_login_attempts: 0,
            locked_until: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn password_hash_and_verify() {
        let password = "SecurePassword123!";
        let hash = hash_password(password).unwrap();
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("WrongPassword", &hash).unwrap());
    }

    #[test]
    fn token_generation_and_validation() {
        let employee = sample_employee(EmployeeRole::Manager);
        let secret = "test-secret-key-for-jwt";
        let tokens = generate_tokens(&employee, secret, 900, 604800).unwrap();
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.expires_in, 900);

        // Validate access token
        let claims = validate_token(&tokens.access_token, secret).unwrap();
        assert_eq!(claims.sub, "clerk");
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.role, "Manager");
        assert_eq!(claims.employee_id, employee.id.to_string());

        // Validate refresh token
        let refresh_claims = validate_token(&tokens.refresh_token, secret).unwrap();
        assert_eq!(refresh_claims.token_type, "refresh");
    }

    #[test]
    fn invalid_token_rejected() {
        let result = validate_token("garbage.token.here", "secret");
        assert!(result.is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let employee = sample_employee(EmployeeRole::Staff);
        let secret = "test-secret";
        // Generate token that expired well beyond the 60s leeway window
        let tokens = generate_tokens(&employee, secret, -3600, -3600).unwrap();
        let result = validate_token(&tokens.access_token, secret);
        assert!(result.is_err());
    }

    #[test]
    fn token_pair_body_omits_refresh_token() {
        let employee = sample_employee(EmployeeRole::Admin);
        let tokens = generate_tokens(&employee, "secret", 900, 604800).unwrap();
        let json = serde_json::to_string(&tokens).unwrap();
        assert!(json.contains("\"accessToken\""));
        assert!(!json.contains("refreshToken"));
    }
}
