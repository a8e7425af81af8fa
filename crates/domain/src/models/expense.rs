//! Expense item and receipt models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_positive_amount;

use super::request::RequestKind;

/// Expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Accommodation,
    Transportation,
    Meals,
    PerDiem,
    LocalConveyance,
    Registration,
    Communication,
    Miscellaneous,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Accommodation => "accommodation",
            ExpenseCategory::Transportation => "transportation",
            ExpenseCategory::Meals => "meals",
            ExpenseCategory::PerDiem => "per_diem",
            ExpenseCategory::LocalConveyance => "local_conveyance",
            ExpenseCategory::Registration => "registration",
            ExpenseCategory::Communication => "communication",
            ExpenseCategory::Miscellaneous => "miscellaneous",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accommodation" => Ok(ExpenseCategory::Accommodation),
            "transportation" => Ok(ExpenseCategory::Transportation),
            "meals" => Ok(ExpenseCategory::Meals),
            "per_diem" => Ok(ExpenseCategory::PerDiem),
            "local_conveyance" => Ok(ExpenseCategory::LocalConveyance),
            "registration" => Ok(ExpenseCategory::Registration),
            "communication" => Ok(ExpenseCategory::Communication),
            "miscellaneous" => Ok(ExpenseCategory::Miscellaneous),
            _ => Err(format!("Invalid expense category: {}", s)),
        }
    }
}

/// A single expense line on a travel or valley request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseItem {
    pub id: Uuid,
    pub request_id: Uuid,
    pub category: ExpenseCategory,
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An expense line as submitted by the employee.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewExpenseItem {
    pub category: ExpenseCategory,

    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

/// Request payload for adding one item to an existing request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddExpenseItemRequest {
    pub request_id: Uuid,

    #[serde(flatten)]
    #[validate(nested)]
    pub item: NewExpenseItem,
}

/// Metadata of an uploaded receipt file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: Uuid,
    pub expense_item_id: Uuid,
    pub request_kind: RequestKind,
    pub original_filename: String,
    pub stored_filename: String,
    pub file_type: String,
    pub storage_path: String,
    pub public_url: String,
    pub upload_date: DateTime<Utc>,
}

/// Everything the store needs to record an uploaded receipt.
#[derive(Debug, Clone)]
pub struct NewReceipt {
    pub expense_item_id: Uuid,
    pub request_kind: RequestKind,
    pub original_filename: String,
    pub stored_filename: String,
    pub file_type: String,
    pub storage_path: String,
    pub public_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_category_strings() {
        assert_eq!(
            serde_json::to_string(&ExpenseCategory::PerDiem).unwrap(),
            "\"per_diem\""
        );
        assert_eq!(
            ExpenseCategory::from_str("local_conveyance").unwrap(),
            ExpenseCategory::LocalConveyance
        );
        assert!(ExpenseCategory::from_str("souvenirs").is_err());
    }

    #[test]
    fn test_new_item_amount_accepts_string_or_number() {
        let item: NewExpenseItem =
            serde_json::from_str(r#"{"category":"meals","amount":"1200.75"}"#).unwrap();
        assert_eq!(item.amount, dec!(1200.75));

        let item: NewExpenseItem =
            serde_json::from_str(r#"{"category":"meals","amount":800}"#).unwrap();
        assert_eq!(item.amount, dec!(800));
    }

    #[test]
    fn test_new_item_rejects_negative_amount() {
        let item = NewExpenseItem {
            category: ExpenseCategory::Transportation,
            amount: dec!(-10),
            description: None,
        };
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_new_item_serializes_for_validation_params() {
        let item = NewExpenseItem {
            category: ExpenseCategory::Meals,
            amount: dec!(450.50),
            description: Some("Lunch".to_string()),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["category"], "meals");
        assert_eq!(json["amount"], "450.50");
        assert_eq!(json["description"], "Lunch");
    }

    #[test]
    fn test_add_item_request_flattens_item() {
        let json = r#"{
            "requestId": "6f1c2a3e-8d7b-4b5c-9a0e-1f2d3c4b5a69",
            "category": "accommodation",
            "amount": 4500,
            "description": "Hotel, two nights"
        }"#;
        let request: AddExpenseItemRequest = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.item.category, ExpenseCategory::Accommodation);
    }
}
