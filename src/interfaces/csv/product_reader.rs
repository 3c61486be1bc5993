use crate::domain::money::Money;
use crate::domain::product::{Category, Product};
use crate::error::{AppError, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct ProductRecord {
    product_id: String,
    name: String,
    category: Category,
    #[serde(default)]
    description: String,
    price: Decimal,
    #[serde(default)]
    weight_kg: Option<Decimal>,
    stock_quantity: u32,
    #[serde(default)]
    is_featured: bool,
    #[serde(default)]
    is_bestseller: bool,
}

impl TryFrom<ProductRecord> for Product {
    type Error = AppError;

    fn try_from(record: ProductRecord) -> Result<Product> {
        Ok(Product {
            in_stock: record.stock_quantity > 0,
            product_id: record.product_id,
            name: record.name,
            category: record.category,
            description: record.description,
            price: Money::new(record.price)?,
            weight_kg: record.weight_kg,
            stock_quantity: record.stock_quantity,
            is_featured: record.is_featured,
            is_bestseller: record.is_bestseller,
            created_at: Utc::now(),
        })
    }
}

/// Reads catalog entries from a CSV source.
///
/// Wraps `csv::Reader` and yields `Result<Product>` lazily, so a large
/// catalog can be imported in a streaming fashion. Whitespace is trimmed and
/// short records tolerated.
pub struct ProductReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ProductReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn products(self) -> impl Iterator<Item = Result<Product>> {
        self.reader.into_deserialize().map(|result| {
            result
                .map_err(AppError::from)
                .and_then(|record: ProductRecord| Product::try_from(record))
        })
    }
}
