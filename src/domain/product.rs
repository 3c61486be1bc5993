use super::money::Money;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tableware,
    Art,
    Custom,
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tableware" => Ok(Self::Tableware),
            "art" => Ok(Self::Art),
            "custom" => Ok(Self::Custom),
            other => Err(AppError::Validation(format!(
                "unknown product category: {other}"
            ))),
        }
    }
}

/// A catalog entry. Referenced by order line items, never owned by them:
/// orders snapshot the name and price at purchase time.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub category: Category,
    pub description: String,
    pub price: Money,
    /// Weight in kg, used only for the shipping quote.
    pub weight_kg: Option<Decimal>,
    pub in_stock: bool,
    pub stock_quantity: u32,
    pub is_featured: bool,
    pub is_bestseller: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn available(&self, quantity: u32) -> bool {
        self.in_stock && self.stock_quantity >= quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bowl(stock: u32) -> Product {
        Product {
            product_id: "bowl-1".to_string(),
            name: "Zen Breakfast Bowl".to_string(),
            category: Category::Tableware,
            description: "Hand-thrown stoneware bowl".to_string(),
            price: Money::new(dec!(650.00)).unwrap(),
            weight_kg: Some(dec!(0.4)),
            in_stock: stock > 0,
            stock_quantity: stock,
            is_featured: true,
            is_bestseller: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_availability() {
        assert!(bowl(5).available(5));
        assert!(!bowl(5).available(6));
        assert!(!bowl(0).available(1));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("art".parse::<Category>().unwrap(), Category::Art);
        assert!("pottery".parse::<Category>().is_err());
    }
}
