use super::custom_order::CustomOrder;
use super::money::Amount;
use super::order::Order;
use super::product::Product;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists an order together with its line items.
    ///
    /// Atomic: the order and its payment-id index entry become visible
    /// together or not at all. Fails with `AppError::DuplicatePayment` when
    /// the gateway payment id has already been recorded.
    async fn insert(&self, order: Order) -> Result<()>;
    async fn get(&self, order_number: &str) -> Result<Option<Order>>;
    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Order>>;
    /// Replaces an existing order (status transitions). There is no delete:
    /// orders are kept for the audit trail.
    async fn update(&self, order: Order) -> Result<()>;
    async fn all(&self) -> Result<Vec<Order>>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn upsert(&self, product: Product) -> Result<()>;
    async fn get(&self, product_id: &str) -> Result<Option<Product>>;
    async fn all(&self) -> Result<Vec<Product>>;
    /// Atomic decrement-if-available. Returns false, leaving stock untouched,
    /// when fewer than `quantity` units remain.
    async fn reserve_stock(&self, product_id: &str, quantity: u32) -> Result<bool>;
}

#[async_trait]
pub trait CustomOrderStore: Send + Sync {
    async fn insert(&self, request: CustomOrder) -> Result<()>;
    async fn get(&self, request_number: &str) -> Result<Option<CustomOrder>>;
    async fn all(&self) -> Result<Vec<CustomOrder>>;
}

/// A charge intent issued by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrder {
    pub id: String,
    pub amount_minor: i64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a charge intent for the given amount. The receipt is the
    /// server-side reference echoed back by the gateway.
    async fn create_order(
        &self,
        amount: Amount,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder>;

    /// Checks the callback signature over (order id, payment id). Any
    /// mismatch is `AppError::SignatureMismatch`.
    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> Result<()>;

    /// Public key id handed to the client SDK.
    fn key_id(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationEvent {
    OrderConfirmation,
    AdminOrderAlert,
    CustomOrderReceived,
    CustomOrderAdminAlert,
}

/// A templated message for a single recipient: an event selects the template,
/// the flat key-value context fills it in.
#[derive(Debug, Clone)]
pub struct Notification {
    pub event: NotificationEvent,
    pub recipient: String,
    pub context: BTreeMap<String, String>,
}

/// Best-effort notification dispatch. Implementations must never propagate
/// delivery failures to the caller; the checkout path depends on that.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, note: Notification);
}

pub type OrderStoreRef = Arc<dyn OrderStore>;
pub type ProductStoreRef = Arc<dyn ProductStore>;
pub type CustomOrderStoreRef = Arc<dyn CustomOrderStore>;
pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
pub type NotifierRef = Arc<dyn Notifier>;
