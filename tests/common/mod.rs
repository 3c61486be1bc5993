use async_trait::async_trait;
use chrono::Utc;
use kilnstore::application::checkout::CheckoutService;
use kilnstore::application::intake::IntakeService;
use kilnstore::domain::money::{Amount, Money};
use kilnstore::domain::ports::{GatewayOrder, PaymentGateway, ProductStore};
use kilnstore::domain::product::{Category, Product};
use kilnstore::domain::shipping::ShippingRates;
use kilnstore::error::{AppError, Result};
use kilnstore::infrastructure::in_memory::{
    InMemoryCustomOrderStore, InMemoryOrderStore, InMemoryProductStore,
};
use kilnstore::infrastructure::notify::{DirectNotifier, Mailer};
use kilnstore::infrastructure::razorpay::signature;
use kilnstore::interfaces::http::AppState;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

pub const TEST_SECRET: &str = "integration_secret";
pub const GATEWAY_ORDER_ID: &str = "order_int_1";

/// Gateway double: deterministic order ids, real HMAC verification against
/// the shared test secret.
pub struct StubGateway;

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_order(
        &self,
        amount: Amount,
        currency: &str,
        _receipt: &str,
    ) -> Result<GatewayOrder> {
        Ok(GatewayOrder {
            id: GATEWAY_ORDER_ID.to_string(),
            amount_minor: amount.to_minor_units()?,
            currency: currency.to_string(),
        })
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, supplied: &str) -> Result<()> {
        if signature(TEST_SECRET, order_id, payment_id)? == supplied {
            Ok(())
        } else {
            Err(AppError::SignatureMismatch)
        }
    }

    fn key_id(&self) -> &str {
        "rzp_test_key"
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
    pub failing: AtomicBool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn deliver(&self, to: &str, subject: &str, _body: &str) -> bool {
        if self.failing.load(Ordering::SeqCst) {
            return false;
        }
        self.sent
            .lock()
            .await
            .push((to.to_string(), subject.to_string()));
        true
    }
}

pub fn product(id: &str, name: &str, category: Category, price: rust_decimal::Decimal, weight: rust_decimal::Decimal, stock: u32, featured: bool) -> Product {
    Product {
        product_id: id.to_string(),
        name: name.to_string(),
        category,
        description: format!("{name}, hand-thrown stoneware"),
        price: Money::new(price).unwrap(),
        weight_kg: Some(weight),
        in_stock: stock > 0,
        stock_quantity: stock,
        is_featured: featured,
        is_bestseller: false,
        created_at: Utc::now(),
    }
}

pub fn rates() -> ShippingRates {
    ShippingRates {
        rate_per_kg: dec!(50),
        minimum_charge: Money::new(dec!(100)).unwrap(),
        free_shipping_threshold: Money::new(dec!(5000)).unwrap(),
    }
}

pub struct TestContext {
    pub state: AppState,
    pub orders: Arc<InMemoryOrderStore>,
    pub products: Arc<InMemoryProductStore>,
    pub mailer: Arc<RecordingMailer>,
}

/// Builds a full application wired against in-memory stores, the stub
/// gateway, and a recording mailer behind a direct notifier.
pub async fn context() -> TestContext {
    let orders = Arc::new(InMemoryOrderStore::new());
    let products = Arc::new(InMemoryProductStore::new());
    let custom_orders = Arc::new(InMemoryCustomOrderStore::new());
    let mailer = Arc::new(RecordingMailer::default());

    products
        .upsert(product(
            "bowl-1",
            "Zen Breakfast Bowl",
            Category::Tableware,
            dec!(750.00),
            dec!(1.75),
            10,
            true,
        ))
        .await
        .unwrap();
    products
        .upsert(product(
            "vase-3",
            "Raku Vase",
            Category::Art,
            dec!(2200.00),
            dec!(1.10),
            3,
            false,
        ))
        .await
        .unwrap();

    let notifier = Arc::new(DirectNotifier::new(mailer.clone()));
    let checkout = Arc::new(CheckoutService::new(
        orders.clone(),
        products.clone(),
        Arc::new(StubGateway),
        notifier.clone(),
        rates(),
        "INR".to_string(),
        "studio@example.com".to_string(),
        false,
    ));
    let intake = Arc::new(IntakeService::new(
        custom_orders,
        notifier,
        "studio@example.com".to_string(),
    ));

    let state = AppState {
        checkout,
        intake,
        products: products.clone(),
        orders: orders.clone(),
    };

    TestContext {
        state,
        orders,
        products,
        mailer,
    }
}

/// A valid callback signature for the stub gateway.
pub fn callback_signature(payment_id: &str) -> String {
    signature(TEST_SECRET, GATEWAY_ORDER_ID, payment_id).unwrap()
}
