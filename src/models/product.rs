//! Product catalog model, shared by the back office and the storefront feed.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// SKU format: uppercase alphanumeric with internal dashes, e.g. `WID-100`.
static SKU_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9-]*$").unwrap());

/// Check a SKU against the catalog format. The import path normalizes case
/// first; the create/update DTOs apply the same rule via their derives.
pub fn is_valid_sku(sku: &str) -> bool {
    SKU_RE.is_match(sku)
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub unit: String,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 64), regex(path = *SKU_RE))]
    pub sku: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(length(min = 1, max = 32))]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(length(min = 1, max = 32))]
    pub unit: Option<String>,
}

/// Public storefront projection — no archive flag or bookkeeping columns.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontProduct {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub unit: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> CreateProduct {
        CreateProduct {
            sku: "WID-100".to_string(),
            name: "Widget".to_string(),
            description: None,
            price: 9.5,
            unit: Some("pcs".to_string()),
        }
    }

    #[test]
    fn sku_format_accepts_uppercase_alphanumeric_dashes() {
        for sku in ["WID-100", "A", "9X", "SKU-2024-01"] {
            let input = CreateProduct {
                sku: sku.to_string(),
                ..valid_create()
            };
            assert!(input.validate().is_ok(), "expected {sku} to be valid");
        }
    }

    #[test]
    fn sku_format_rejects_lowercase_and_leading_dash() {
        for sku in ["wid-100", "-X", "WID 100", "wïd"] {
            let input = CreateProduct {
                sku: sku.to_string(),
                ..valid_create()
            };
            assert!(input.validate().is_err(), "expected {sku} to be rejected");
        }
    }

    #[test]
    fn negative_price_is_rejected() {
        let input = CreateProduct {
            price: -0.01,
            ..valid_create()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));
    }

    #[test]
    fn storefront_projection_has_no_archive_flag() {
        let product = StorefrontProduct {
            id: Uuid::nil(),
            sku: "WID-100".to_string(),
            name: "Widget".to_string(),
            description: None,
            price: 9.5,
            unit: "pcs".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&product).unwrap();
        assert!(!json.contains("rchived"));
        assert!(json.contains("\"createdAt\""));
    }
}
