use crate::domain::custom_order::CustomOrder;
use crate::domain::order::Order;
use crate::domain::ports::{CustomOrderStore, OrderStore, ProductStore};
use crate::domain::product::Product;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct OrderMaps {
    orders: HashMap<String, Order>,
    /// Gateway payment id -> order number. Lives under the same lock as the
    /// order map so inserts stay atomic.
    by_payment: HashMap<String, String>,
}

/// A thread-safe in-memory order store.
///
/// The order map and the payment-id index share a single `RwLock`, so an
/// insert either publishes both entries or neither. Ideal for tests and
/// single-process deployments without persistence.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<OrderMaps>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let mut maps = self.inner.write().await;
        if let Some(existing) = maps.by_payment.get(&order.gateway_payment_id) {
            return Err(AppError::DuplicatePayment {
                payment_id: order.gateway_payment_id.clone(),
                order_number: existing.clone(),
            });
        }
        if maps.orders.contains_key(&order.order_number) {
            return Err(AppError::Storage(format!(
                "order number collision: {}",
                order.order_number
            )));
        }
        maps.by_payment
            .insert(order.gateway_payment_id.clone(), order.order_number.clone());
        maps.orders.insert(order.order_number.clone(), order);
        Ok(())
    }

    async fn get(&self, order_number: &str) -> Result<Option<Order>> {
        let maps = self.inner.read().await;
        Ok(maps.orders.get(order_number).cloned())
    }

    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Order>> {
        let maps = self.inner.read().await;
        Ok(maps
            .by_payment
            .get(payment_id)
            .and_then(|number| maps.orders.get(number))
            .cloned())
    }

    async fn update(&self, order: Order) -> Result<()> {
        let mut maps = self.inner.write().await;
        if !maps.orders.contains_key(&order.order_number) {
            return Err(AppError::NotFound(format!(
                "order {}",
                order.order_number
            )));
        }
        maps.orders.insert(order.order_number.clone(), order);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Order>> {
        let maps = self.inner.read().await;
        let mut orders: Vec<Order> = maps.orders.values().cloned().collect();
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.order_number.cmp(&a.order_number))
        });
        Ok(orders)
    }
}

/// A thread-safe in-memory catalog store.
///
/// Stock reservation takes the write lock for the whole decrement, so
/// concurrent reservations can never drive stock negative.
#[derive(Default, Clone)]
pub struct InMemoryProductStore {
    products: Arc<RwLock<HashMap<String, Product>>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn upsert(&self, product: Product) -> Result<()> {
        let mut products = self.products.write().await;
        products.insert(product.product_id.clone(), product);
        Ok(())
    }

    async fn get(&self, product_id: &str) -> Result<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(product_id).cloned())
    }

    async fn all(&self) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        let mut all: Vec<Product> = products.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn reserve_stock(&self, product_id: &str, quantity: u32) -> Result<bool> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(product_id)
            .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
        if product.stock_quantity < quantity {
            return Ok(false);
        }
        product.stock_quantity -= quantity;
        if product.stock_quantity == 0 {
            product.in_stock = false;
        }
        Ok(true)
    }
}

/// A thread-safe in-memory store for custom-order intake requests.
#[derive(Default, Clone)]
pub struct InMemoryCustomOrderStore {
    requests: Arc<RwLock<HashMap<String, CustomOrder>>>,
}

impl InMemoryCustomOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CustomOrderStore for InMemoryCustomOrderStore {
    async fn insert(&self, request: CustomOrder) -> Result<()> {
        let mut requests = self.requests.write().await;
        requests.insert(request.request_number.clone(), request);
        Ok(())
    }

    async fn get(&self, request_number: &str) -> Result<Option<CustomOrder>> {
        let requests = self.requests.read().await;
        Ok(requests.get(request_number).cloned())
    }

    async fn all(&self) -> Result<Vec<CustomOrder>> {
        let requests = self.requests.read().await;
        let mut all: Vec<CustomOrder> = requests.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use crate::domain::order::{
        Customer, Order, OrderItem, OrderTotals, PaymentMethod, ShippingAddress,
    };
    use crate::domain::product::Category;
    use rust_decimal_macros::dec;

    fn order(payment_id: &str) -> Order {
        let totals = OrderTotals::new(
            Money::new(dec!(1500)).unwrap(),
            Money::new(dec!(175)).unwrap(),
            Money::ZERO,
            Money::ZERO,
        )
        .unwrap();
        Order::confirmed(
            Customer {
                name: "Asha Rao".to_string(),
                email: "asha@example.com".to_string(),
                phone: "9876543210".to_string(),
            },
            ShippingAddress {
                address: "12 Pottery Lane".to_string(),
                city: "Pune".to_string(),
                state: "MH".to_string(),
                pincode: "411001".to_string(),
            },
            PaymentMethod::Razorpay,
            totals,
            vec![OrderItem {
                product_id: "bowl-1".to_string(),
                product_name: "Zen Breakfast Bowl".to_string(),
                unit_price: Money::new(dec!(750)).unwrap(),
                quantity: 2,
            }],
            "order_abc",
            payment_id,
        )
    }

    fn vase(stock: u32) -> Product {
        Product {
            product_id: "vase-3".to_string(),
            name: "Raku Vase".to_string(),
            category: Category::Art,
            description: "Crackle-glazed raku vase".to_string(),
            price: Money::new(dec!(2200)).unwrap(),
            weight_kg: Some(dec!(1.1)),
            in_stock: stock > 0,
            stock_quantity: stock,
            is_featured: false,
            is_bestseller: true,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_order_store_roundtrip() {
        let store = InMemoryOrderStore::new();
        let order = order("pay_1");
        store.insert(order.clone()).await.unwrap();

        let by_number = store.get(&order.order_number).await.unwrap().unwrap();
        assert_eq!(by_number, order);

        let by_payment = store.find_by_payment_id("pay_1").await.unwrap().unwrap();
        assert_eq!(by_payment.order_number, order.order_number);

        assert!(store.get("ORD-missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_order_store_rejects_duplicate_payment() {
        let store = InMemoryOrderStore::new();
        store.insert(order("pay_1")).await.unwrap();

        let second = order("pay_1");
        let result = store.insert(second).await;
        assert!(matches!(result, Err(AppError::DuplicatePayment { .. })));
        assert_eq!(store.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_order_store_update_requires_existing() {
        let store = InMemoryOrderStore::new();
        let result = store.update(order("pay_1")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reserve_stock_decrements() {
        let store = InMemoryProductStore::new();
        store.upsert(vase(3)).await.unwrap();

        assert!(store.reserve_stock("vase-3", 2).await.unwrap());
        let product = store.get("vase-3").await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 1);
        assert!(product.in_stock);
    }

    #[tokio::test]
    async fn test_reserve_stock_refuses_shortfall() {
        let store = InMemoryProductStore::new();
        store.upsert(vase(1)).await.unwrap();

        assert!(!store.reserve_stock("vase-3", 2).await.unwrap());
        let product = store.get("vase-3").await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 1);
    }

    #[tokio::test]
    async fn test_reserve_to_zero_marks_out_of_stock() {
        let store = InMemoryProductStore::new();
        store.upsert(vase(2)).await.unwrap();

        assert!(store.reserve_stock("vase-3", 2).await.unwrap());
        let product = store.get("vase-3").await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 0);
        assert!(!product.in_stock);
    }

    #[tokio::test]
    async fn test_concurrent_reservations_never_oversell() {
        let store = Arc::new(InMemoryProductStore::new());
        store.upsert(vase(10)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.reserve_stock("vase-3", 1).await.unwrap()
            }));
        }
        let mut reserved = 0;
        for handle in handles {
            if handle.await.unwrap() {
                reserved += 1;
            }
        }

        assert_eq!(reserved, 10);
        let product = store.get("vase-3").await.unwrap().unwrap();
        assert_eq!(product.stock_quantity, 0);
    }
}
