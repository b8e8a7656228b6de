//! Customer records for the back office.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomer {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 32))]
    pub phone: String,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomer {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 3, max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_wire_shape_is_camel_case() {
        let customer = Customer {
            id: Uuid::nil(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+4670000001".to_string(),
            address: None,
            is_archived: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&customer).unwrap();
        assert!(json.contains("\"isArchived\""));
        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("\"is_archived\""));
    }

    #[test]
    fn create_customer_rejects_bad_email_and_phone() {
        let input = CreateCustomer {
            name: "Ada".to_string(),
            email: "nope".to_string(),
            phone: "1".to_string(),
            address: None,
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("phone"));
    }

    #[test]
    fn update_customer_accepts_partial_patch() {
        let patch = UpdateCustomer {
            phone: Some("+4670000002".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }
}
