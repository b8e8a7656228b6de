//! Warehouse registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
    /// Storage capacity in stock-keeping units; absent when unbounded.
    pub capacity: Option<i32>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWarehouse {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 500))]
    pub location: Option<String>,
    #[validate(range(min = 0))]
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWarehouse {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub location: Option<String>,
    #[validate(range(min = 0))]
    pub capacity: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_capacity_is_rejected() {
        let input = CreateWarehouse {
            name: "North Hub".to_string(),
            location: None,
            capacity: Some(-5),
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("capacity"));
    }

    #[test]
    fn capacity_is_optional() {
        let input = CreateWarehouse {
            name: "North Hub".to_string(),
            location: Some("Dock 4".to_string()),
            capacity: None,
        };
        assert!(input.validate().is_ok());
    }
}
