use super::money::Money;
use crate::error::AppError;
use rust_decimal::Decimal;

/// Shipping rate configuration, loaded once at startup.
#[derive(Debug, Clone, Copy)]
pub struct ShippingRates {
    pub rate_per_kg: Decimal,
    pub minimum_charge: Money,
    pub free_shipping_threshold: Money,
}

impl ShippingRates {
    /// Quotes the shipping charge for a cart.
    ///
    /// Zero at or above the free-shipping threshold; otherwise the weight
    /// charge, floored at the minimum.
    pub fn quote(&self, total_weight_kg: Decimal, subtotal: Money) -> Result<Money, AppError> {
        if total_weight_kg < Decimal::ZERO {
            return Err(AppError::Validation(
                "cart weight must not be negative".to_string(),
            ));
        }
        if subtotal >= self.free_shipping_threshold {
            return Ok(Money::ZERO);
        }
        let by_weight = Money::new(total_weight_kg * self.rate_per_kg)?;
        Ok(by_weight.max(self.minimum_charge))
    }
}
