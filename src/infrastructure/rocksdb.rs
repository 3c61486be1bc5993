use crate::domain::custom_order::CustomOrder;
use crate::domain::order::Order;
use crate::domain::ports::{CustomOrderStore, OrderStore, ProductStore};
use crate::domain::product::Product;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options, WriteBatch};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Column Family for order records, keyed by order number.
pub const CF_ORDERS: &str = "orders";
/// Column Family mapping gateway payment ids to order numbers.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family for catalog entries, keyed by product id.
pub const CF_PRODUCTS: &str = "products";
/// Column Family for custom-order intake requests.
pub const CF_CUSTOM_ORDERS: &str = "custom_orders";

/// A persistent store implementation using RocksDB.
///
/// One database serves all four column families. Order inserts write the
/// order row and its payment-id index entry in a single `WriteBatch`, and all
/// read-modify-write paths (insert uniqueness check, stock reservation) run
/// under a store-level write lock, so records become visible together or not
/// at all.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDbStore {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [CF_ORDERS, CF_PAYMENTS, CF_PRODUCTS, CF_CUSTOM_ORDERS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, cfs)
            .map_err(|e| AppError::Storage(format!("failed to open database: {e}")))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| AppError::Storage(format!("column family not found: {name}")))
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, cf: &str, key: &[u8]) -> Result<Option<T>> {
        let handle = self.cf(cf)?;
        let bytes = self
            .db
            .get_cf(handle, key)
            .map_err(|e| AppError::Storage(e.to_string()))?;
        match bytes {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan_json<T: serde::de::DeserializeOwned>(&self, cf: &str) -> Result<Vec<T>> {
        let handle = self.cf(cf)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(handle, rocksdb::IteratorMode::Start) {
            let (_key, value) = item.map_err(|e| AppError::Storage(e.to_string()))?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl OrderStore for RocksDbStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let orders_cf = self.cf(CF_ORDERS)?;
        let payments_cf = self.cf(CF_PAYMENTS)?;
        let value = serde_json::to_vec(&order)?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AppError::Storage("store lock poisoned".to_string()))?;

        if let Some(existing) = self
            .db
            .get_cf(payments_cf, order.gateway_payment_id.as_bytes())
            .map_err(|e| AppError::Storage(e.to_string()))?
        {
            return Err(AppError::DuplicatePayment {
                payment_id: order.gateway_payment_id.clone(),
                order_number: String::from_utf8_lossy(&existing).into_owned(),
            });
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(orders_cf, order.order_number.as_bytes(), &value);
        batch.put_cf(
            payments_cf,
            order.gateway_payment_id.as_bytes(),
            order.order_number.as_bytes(),
        );
        self.db
            .write(batch)
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn get(&self, order_number: &str) -> Result<Option<Order>> {
        self.get_json(CF_ORDERS, order_number.as_bytes())
    }

    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Order>> {
        let handle = self.cf(CF_PAYMENTS)?;
        let number = self
            .db
            .get_cf(handle, payment_id.as_bytes())
            .map_err(|e| AppError::Storage(e.to_string()))?;
        match number {
            Some(number) => {
                self.get_json(CF_ORDERS, &number)
            }
            None => Ok(None),
        }
    }

    async fn update(&self, order: Order) -> Result<()> {
        let handle = self.cf(CF_ORDERS)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AppError::Storage("store lock poisoned".to_string()))?;
        if self
            .db
            .get_cf(handle, order.order_number.as_bytes())
            .map_err(|e| AppError::Storage(e.to_string()))?
            .is_none()
        {
            return Err(AppError::NotFound(format!("order {}", order.order_number)));
        }
        let value = serde_json::to_vec(&order)?;
        self.db
            .put_cf(handle, order.order_number.as_bytes(), value)
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn all(&self) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self.scan_json(CF_ORDERS)?;
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.order_number.cmp(&a.order_number))
        });
        Ok(orders)
    }
}

#[async_trait]
impl ProductStore for RocksDbStore {
    async fn upsert(&self, product: Product) -> Result<()> {
        let handle = self.cf(CF_PRODUCTS)?;
        let value = serde_json::to_vec(&product)?;
        self.db
            .put_cf(handle, product.product_id.as_bytes(), value)
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn get(&self, product_id: &str) -> Result<Option<Product>> {
        self.get_json(CF_PRODUCTS, product_id.as_bytes())
    }

    async fn all(&self) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self.scan_json(CF_PRODUCTS)?;
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn reserve_stock(&self, product_id: &str, quantity: u32) -> Result<bool> {
        let handle = self.cf(CF_PRODUCTS)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AppError::Storage("store lock poisoned".to_string()))?;

        let bytes = self
            .db
            .get_cf(handle, product_id.as_bytes())
            .map_err(|e| AppError::Storage(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
        let mut product: Product = serde_json::from_slice(&bytes)?;

        if product.stock_quantity < quantity {
            return Ok(false);
        }
        product.stock_quantity -= quantity;
        if product.stock_quantity == 0 {
            product.in_stock = false;
        }
        let value = serde_json::to_vec(&product)?;
        self.db
            .put_cf(handle, product_id.as_bytes(), value)
            .map_err(|e| AppError::Storage(e.to_string()))?;
        Ok(true)
    }
}

#[async_trait]
impl CustomOrderStore for RocksDbStore {
    async fn insert(&self, request: CustomOrder) -> Result<()> {
        let handle = self.cf(CF_CUSTOM_ORDERS)?;
        let value = serde_json::to_vec(&request)?;
        self.db
            .put_cf(handle, request.request_number.as_bytes(), value)
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    async fn get(&self, request_number: &str) -> Result<Option<CustomOrder>> {
        self.get_json(CF_CUSTOM_ORDERS, request_number.as_bytes())
    }

    async fn all(&self) -> Result<Vec<CustomOrder>> {
        let mut requests: Vec<CustomOrder> = self.scan_json(CF_CUSTOM_ORDERS)?;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use crate::domain::order::{
        Customer, OrderItem, OrderTotals, PaymentMethod, ShippingAddress,
    };
    use crate::domain::product::Category;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

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

    #[tokio::test]
    async fn test_open_creates_column_families() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).expect("failed to open store");
        for name in [CF_ORDERS, CF_PAYMENTS, CF_PRODUCTS, CF_CUSTOM_ORDERS] {
            assert!(store.db.cf_handle(name).is_some());
        }
    }

    #[tokio::test]
    async fn test_order_roundtrip_and_payment_index() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();

        let order = order("pay_1");
        OrderStore::insert(&store, order.clone()).await.unwrap();

        let by_number = OrderStore::get(&store, &order.order_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_number, order);

        let by_payment = store.find_by_payment_id("pay_1").await.unwrap().unwrap();
        assert_eq!(by_payment.order_number, order.order_number);
    }

    #[tokio::test]
    async fn test_duplicate_payment_rejected() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();

        OrderStore::insert(&store, order("pay_1")).await.unwrap();
        let result = OrderStore::insert(&store, order("pay_1")).await;
        assert!(matches!(result, Err(AppError::DuplicatePayment { .. })));
        assert_eq!(OrderStore::all(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_product_stock_reservation() {
        let dir = tempdir().unwrap();
        let store = RocksDbStore::open(dir.path()).unwrap();

        let product = Product {
            product_id: "vase-3".to_string(),
            name: "Raku Vase".to_string(),
            category: Category::Art,
            description: "Crackle-glazed raku vase".to_string(),
            price: Money::new(dec!(2200)).unwrap(),
            weight_kg: Some(dec!(1.1)),
            in_stock: true,
            stock_quantity: 2,
            is_featured: false,
            is_bestseller: true,
            created_at: chrono::Utc::now(),
        };
        ProductStore::upsert(&store, product).await.unwrap();

        assert!(store.reserve_stock("vase-3", 2).await.unwrap());
        assert!(!store.reserve_stock("vase-3", 1).await.unwrap());

        let stored = ProductStore::get(&store, "vase-3").await.unwrap().unwrap();
        assert_eq!(stored.stock_quantity, 0);
        assert!(!stored.in_stock);
    }
}
