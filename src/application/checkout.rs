use crate::domain::money::{Amount, Money};
use crate::domain::order::{
    Customer, Order, OrderItem, OrderTotals, PaymentMethod, ShippingAddress, next_reference,
};
use crate::domain::ports::{
    Notification, NotificationEvent, NotifierRef, OrderStoreRef, PaymentGatewayRef,
    ProductStoreRef,
};
use crate::domain::shipping::ShippingRates;
use crate::error::{AppError, Result};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// A cart line as submitted by the client: a product reference and a
/// quantity. Prices are never taken from the client.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
    pub customer: Customer,
}

/// What the client SDK needs to open the payment dialog.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub gateway_order_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub key_id: String,
}

/// The gateway callback plus the order payload collected from the client's
/// cart state.
#[derive(Debug, Clone)]
pub struct VerifiedCheckout {
    pub gateway_order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub customer: Customer,
    pub address: ShippingAddress,
    pub items: Vec<CartLine>,
    pub payment_method: PaymentMethod,
    pub tax: Money,
    pub discount: Money,
}

struct PricedCart {
    items: Vec<OrderItem>,
    subtotal: Money,
    total_weight_kg: Decimal,
}

/// Turns client-initiated payments into durable, trustworthy orders.
///
/// Owns the collaborator ports and enforces the two hard guarantees of the
/// checkout path: no order without a verified signature, and no second order
/// for an already-recorded payment.
pub struct CheckoutService {
    orders: OrderStoreRef,
    products: ProductStoreRef,
    gateway: PaymentGatewayRef,
    notifier: NotifierRef,
    shipping: ShippingRates,
    currency: String,
    company_email: String,
    expose_gateway_detail: bool,
}

impl CheckoutService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        orders: OrderStoreRef,
        products: ProductStoreRef,
        gateway: PaymentGatewayRef,
        notifier: NotifierRef,
        shipping: ShippingRates,
        currency: String,
        company_email: String,
        expose_gateway_detail: bool,
    ) -> Self {
        Self {
            orders,
            products,
            gateway,
            notifier,
            shipping,
            currency,
            company_email,
            expose_gateway_detail,
        }
    }

    pub fn shipping_rates(&self) -> ShippingRates {
        self.shipping
    }

    /// Prices a cart against the catalog, snapshotting name and unit price.
    ///
    /// `check_stock` is on for intent creation and off for verification: once
    /// a payment is captured, a stock shortfall must not void the order.
    async fn price_cart(&self, lines: &[CartLine], check_stock: bool) -> Result<PricedCart> {
        if lines.is_empty() {
            return Err(AppError::Validation("cart is empty".to_string()));
        }

        let mut items = Vec::with_capacity(lines.len());
        let mut subtotal = Money::ZERO;
        let mut total_weight_kg = Decimal::ZERO;

        for line in lines {
            if line.quantity == 0 {
                return Err(AppError::Validation(format!(
                    "quantity for {} must be at least 1",
                    line.product_id
                )));
            }
            let product = self
                .products
                .get(&line.product_id)
                .await?
                .ok_or_else(|| {
                    AppError::Validation(format!("unknown product: {}", line.product_id))
                })?;
            if check_stock && !product.available(line.quantity) {
                return Err(AppError::Validation(format!(
                    "{} is out of stock",
                    product.name
                )));
            }

            subtotal += product.price.times(line.quantity);
            total_weight_kg +=
                product.weight_kg.unwrap_or_default() * Decimal::from(line.quantity);
            items.push(OrderItem {
                product_id: product.product_id,
                product_name: product.name,
                unit_price: product.price,
                quantity: line.quantity,
            });
        }

        Ok(PricedCart {
            items,
            subtotal,
            total_weight_kg,
        })
    }

    /// Creates a payment intent with the gateway for the server-priced cart
    /// total. Validation failures are reported before any gateway call.
    pub async fn create_payment_intent(&self, req: CheckoutRequest) -> Result<PaymentIntent> {
        let cart = self.price_cart(&req.items, true).await?;
        let shipping = self.shipping.quote(cart.total_weight_kg, cart.subtotal)?;
        let totals = OrderTotals::new(cart.subtotal, shipping, Money::ZERO, Money::ZERO)?;
        let amount = Amount::try_from(totals.total)?;

        let receipt = next_reference("rcpt");
        let gateway_order = self
            .gateway
            .create_order(amount, &self.currency, &receipt)
            .await
            .map_err(|e| self.gateway_failure(e))?;

        info!(
            gateway_order_id = %gateway_order.id,
            amount_minor = gateway_order.amount_minor,
            customer_email = %req.customer.email,
            "payment intent created"
        );

        Ok(PaymentIntent {
            gateway_order_id: gateway_order.id,
            amount_minor: gateway_order.amount_minor,
            currency: gateway_order.currency,
            key_id: self.gateway.key_id().to_string(),
        })
    }

    /// Verifies the gateway callback and persists the order.
    ///
    /// Any signature mismatch fails hard before any state is written. A
    /// payment id that was already recorded returns the existing order
    /// number instead of creating a second order.
    pub async fn verify_and_record(&self, req: VerifiedCheckout) -> Result<String> {
        self.gateway
            .verify_signature(&req.gateway_order_id, &req.payment_id, &req.signature)?;

        if let Some(existing) = self.orders.find_by_payment_id(&req.payment_id).await? {
            info!(
                payment_id = %req.payment_id,
                order_number = %existing.order_number,
                "payment already recorded, returning existing order"
            );
            return Ok(existing.order_number);
        }

        let cart = self.price_cart(&req.items, false).await?;
        let shipping = self.shipping.quote(cart.total_weight_kg, cart.subtotal)?;
        let totals = OrderTotals::new(cart.subtotal, shipping, req.tax, req.discount)?;

        let order = Order::confirmed(
            req.customer,
            req.address,
            req.payment_method,
            totals,
            cart.items,
            &req.gateway_order_id,
            &req.payment_id,
        );
        let order_number = order.order_number.clone();

        match self.orders.insert(order.clone()).await {
            Ok(()) => {}
            // Lost a concurrent race on the same payment id: the other
            // submission won, hand back its order number.
            Err(AppError::DuplicatePayment { order_number, .. }) => {
                return Ok(order_number);
            }
            Err(e) => return Err(e),
        }

        info!(
            order_number = %order_number,
            payment_id = %req.payment_id,
            total = %order.totals.total,
            "order recorded"
        );

        for item in &order.items {
            match self
                .products
                .reserve_stock(&item.product_id, item.quantity)
                .await
            {
                Ok(true) => {}
                Ok(false) => warn!(
                    product_id = %item.product_id,
                    order_number = %order_number,
                    "stock short at confirmation, flagged for reconciliation"
                ),
                Err(e) => warn!(
                    product_id = %item.product_id,
                    order_number = %order_number,
                    error = %e,
                    "stock reservation failed"
                ),
            }
        }

        self.notifier
            .notify(order_confirmation(&order))
            .await;
        self.notifier
            .notify(admin_order_alert(&order, &self.company_email))
            .await;

        Ok(order_number)
    }

    /// Gateway failures go to the log in full; the caller sees a generic
    /// message unless the service runs in debug-errors mode.
    fn gateway_failure(&self, err: AppError) -> AppError {
        match err {
            AppError::Gateway(detail) => {
                error!(detail = %detail, "payment gateway request failed");
                if self.expose_gateway_detail {
                    AppError::Gateway(detail)
                } else {
                    AppError::Gateway("payment gateway request failed".to_string())
                }
            }
            other => other,
        }
    }
}

fn order_context(order: &Order) -> BTreeMap<String, String> {
    let mut ctx = BTreeMap::new();
    ctx.insert("order_number".to_string(), order.order_number.clone());
    ctx.insert("customer_name".to_string(), order.customer.name.clone());
    ctx.insert("customer_email".to_string(), order.customer.email.clone());
    ctx.insert("customer_phone".to_string(), order.customer.phone.clone());
    ctx.insert("subtotal".to_string(), order.totals.subtotal.to_string());
    ctx.insert(
        "shipping_charge".to_string(),
        order.totals.shipping.to_string(),
    );
    ctx.insert("tax_amount".to_string(), order.totals.tax.to_string());
    ctx.insert(
        "discount_amount".to_string(),
        order.totals.discount.to_string(),
    );
    ctx.insert("total_amount".to_string(), order.totals.total.to_string());
    ctx.insert(
        "shipping_address".to_string(),
        format!(
            "{}, {}, {} {}",
            order.address.address, order.address.city, order.address.state, order.address.pincode
        ),
    );
    ctx.insert(
        "items".to_string(),
        order
            .items
            .iter()
            .map(|i| format!("{} x {} = {}", i.product_name, i.quantity, i.line_total()))
            .collect::<Vec<_>>()
            .join("; "),
    );
    ctx
}

fn order_confirmation(order: &Order) -> Notification {
    Notification {
        event: NotificationEvent::OrderConfirmation,
        recipient: order.customer.email.clone(),
        context: order_context(order),
    }
}

fn admin_order_alert(order: &Order, company_email: &str) -> Notification {
    Notification {
        event: NotificationEvent::AdminOrderAlert,
        recipient: company_email.to_string(),
        context: order_context(order),
    }
}
