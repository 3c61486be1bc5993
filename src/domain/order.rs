use super::money::Money;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

static REFERENCE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generates a server-side reference such as `ORD-202608051430120007`.
///
/// Timestamp-derived with a process-wide sequence suffix, so references issued
/// within the same second remain distinguishable.
pub fn next_reference(prefix: &str) -> String {
    let seq = REFERENCE_SEQ.fetch_add(1, Ordering::Relaxed) % 10_000;
    format!("{prefix}-{}{seq:04}", Utc::now().format("%Y%m%d%H%M%S"))
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Admin-driven transition table. The only automatic transition in the
    /// system is pending -> confirmed, which accompanies verified payment.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Processing)
                | (Confirmed, Cancelled)
                | (Processing, Shipped)
                | (Processing, Cancelled)
                | (Shipped, Delivered)
                | (Delivered, Refunded)
                | (Cancelled, Refunded)
        )
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            other => Err(AppError::Validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Razorpay,
    Cod,
    #[serde(rename = "bank_transfer")]
    BankTransfer,
}

impl FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "razorpay" => Ok(Self::Razorpay),
            "cod" => Ok(Self::Cod),
            "bank_transfer" => Ok(Self::BankTransfer),
            other => Err(AppError::Validation(format!(
                "unknown payment method: {other}"
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Monetary breakdown of an order. Constructed, never accepted: the total is
/// always derived as subtotal + shipping + tax - discount, and a discount that
/// would push the total below zero is rejected.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl OrderTotals {
    pub fn new(
        subtotal: Money,
        shipping: Money,
        tax: Money,
        discount: Money,
    ) -> Result<Self, AppError> {
        let gross = subtotal + shipping + tax;
        let total = gross.checked_sub(discount).ok_or_else(|| {
            AppError::Validation("discount exceeds the order value".to_string())
        })?;
        Ok(Self {
            subtotal,
            shipping,
            tax,
            discount,
            total,
        })
    }
}

/// A line-item snapshot. Name and unit price are copied from the catalog at
/// order time so later catalog edits cannot alter historical orders.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl OrderItem {
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// A durable purchase record. Created exactly once, at payment verification
/// time, together with its line items; mutated afterwards only through status
/// transitions; never deleted.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub order_number: String,
    pub customer: Customer,
    pub address: ShippingAddress,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    /// Only ever set after successful signature verification.
    pub payment_received: bool,
    pub totals: OrderTotals,
    pub items: Vec<OrderItem>,
    /// Uniqueness guard against double-recording a payment.
    pub gateway_payment_id: String,
    pub internal_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds a confirmed, paid order from a verified payment. The gateway
    /// identifiers go into the internal notes for audit and reconciliation.
    pub fn confirmed(
        customer: Customer,
        address: ShippingAddress,
        payment_method: PaymentMethod,
        totals: OrderTotals,
        items: Vec<OrderItem>,
        gateway_order_id: &str,
        gateway_payment_id: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            order_number: next_reference("ORD"),
            customer,
            address,
            status: OrderStatus::Confirmed,
            payment_method,
            payment_received: true,
            totals,
            items,
            gateway_payment_id: gateway_payment_id.to_string(),
            internal_notes: format!(
                "razorpay_order_id={gateway_order_id} razorpay_payment_id={gateway_payment_id}"
            ),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn transition(&mut self, next: OrderStatus) -> Result<(), AppError> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::Validation(format!(
                "order {} cannot move from {:?} to {:?}",
                self.order_number, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}
