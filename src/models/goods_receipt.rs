//! Goods receipts: inbound deliveries from a supplier into a warehouse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// One received line. Stored as part of the receipt's JSONB `items` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    #[validate(range(min = 0.0))]
    pub unit_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GoodsReceipt {
    pub id: Uuid,
    pub reference: String,
    pub supplier_id: Uuid,
    pub warehouse_id: Uuid,
    pub received_at: DateTime<Utc>,
    pub note: Option<String>,
    pub items: serde_json::Value,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoodsReceipt {
    #[validate(length(min = 1, max = 64))]
    pub reference: String,
    pub supplier_id: Uuid,
    pub warehouse_id: Uuid,
    pub received_at: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
    #[validate(length(min = 1), nested)]
    pub items: Vec<ReceiptLine>,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoodsReceipt {
    #[validate(length(min = 1, max = 64))]
    pub reference: Option<String>,
    pub received_at: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
    #[validate(length(min = 1), nested)]
    pub items: Option<Vec<ReceiptLine>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32, unit_cost: f64) -> ReceiptLine {
        ReceiptLine {
            product_id: Uuid::new_v4(),
            quantity,
            unit_cost,
        }
    }

    #[test]
    fn receipt_requires_at_least_one_line() {
        let input = CreateGoodsReceipt {
            reference: "GR-2024-001".to_string(),
            supplier_id: Uuid::new_v4(),
            warehouse_id: Uuid::new_v4(),
            received_at: None,
            note: None,
            items: vec![],
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.errors().contains_key("items"));
    }

    #[test]
    fn zero_quantity_line_is_rejected() {
        let input = CreateGoodsReceipt {
            reference: "GR-2024-001".to_string(),
            supplier_id: Uuid::new_v4(),
            warehouse_id: Uuid::new_v4(),
            received_at: None,
            note: None,
            items: vec![line(0, 2.5)],
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn negative_unit_cost_is_rejected() {
        assert!(line(1, -0.5).validate().is_err());
        assert!(line(1, 0.0).validate().is_ok());
    }

    #[test]
    fn receipt_line_wire_shape_is_camel_case() {
        let json = serde_json::to_string(&line(3, 12.0)).unwrap();
        assert!(json.contains("\"productId\""));
        assert!(json.contains("\"unitCost\""));
    }
}
