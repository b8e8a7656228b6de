//! Employee model with role-based access control.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "employee_role")]
pub enum EmployeeRole {
    Admin,
    Manager,
    Staff,
}

/// Full employee row from database (includes password_hash — never serialize to API).
#[derive(Debug, Clone, FromRow)]
pub struct Employee {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: EmployeeRole,
    pub is_active: bool,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Employee response DTO — excludes password_hash and lockout bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: EmployeeRole,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Employee> for EmployeeResponse {
    fn from(e: Employee) -> Self {
        Self {
            id: e.id,
            username: e.username,
            email: e.email,
            full_name: e.full_name,
            role: e.role,
            is_active: e.is_active,
            last_login: e.last_login,
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployee {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    pub role: EmployeeRole,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployee {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub full_name: Option<String>,
    pub role: Option<EmployeeRole>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_employee() -> Employee {
        Employee {
            id: Uuid::nil(),
            username: "clerk".to_string(),
            email: "clerk@shop.test".to_string(),
            password_hash: "secret_hash".to_string(),
            full_name: "Back Office Clerk".to_string(),
            role: EmployeeRole::Staff,
            is_active: true,
            failed_login_attempts: 0,
            locked_until: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn employee_role_serialization() {
        let json = serde_json::to_string(&EmployeeRole::Manager).unwrap();
        assert_eq!(json, "\"Manager\"");
    }

    #[test]
    fn employee_response_excludes_password() {
        let response: EmployeeResponse = sample_employee().into();
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("hash"));
        assert!(json.contains("\"fullName\""));
    }

    #[test]
    fn employee_to_response_conversion() {
        let response: EmployeeResponse = sample_employee().into();
        assert_eq!(response.username, "clerk");
        assert_eq!(response.role, EmployeeRole::Staff);
    }

    #[test]
    fn create_employee_validation() {
        let input = CreateEmployee {
            username: "ab".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            full_name: String::new(),
            role: EmployeeRole::Staff,
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
        assert!(errors.field_errors().contains_key("full_name"));
    }

    #[test]
    fn update_employee_allows_empty_patch() {
        assert!(UpdateEmployee::default().validate().is_ok());
    }
}
