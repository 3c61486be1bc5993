use crate::application::checkout::{CartLine, CheckoutRequest, VerifiedCheckout};
use crate::application::intake::CustomOrderRequest;
use crate::domain::custom_order::ProjectType;
use crate::domain::money::Money;
use crate::domain::order::{Customer, PaymentMethod, ShippingAddress};
use crate::error::{AppError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CartLineDto {
    pub product_id: String,
    pub quantity: u32,
}

impl From<CartLineDto> for CartLine {
    fn from(dto: CartLineDto) -> Self {
        Self {
            product_id: dto.product_id,
            quantity: dto.quantity,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<CartLineDto>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
}

impl From<CreateOrderRequest> for CheckoutRequest {
    fn from(dto: CreateOrderRequest) -> Self {
        Self {
            items: dto.items.into_iter().map(CartLine::from).collect(),
            customer: Customer {
                name: dto.customer_name,
                email: dto.customer_email,
                phone: dto.customer_phone,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderPayloadDto {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_pincode: String,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub tax_amount: Option<Decimal>,
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
    pub items: Vec<CartLineDto>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub order_data: OrderPayloadDto,
}

impl TryFrom<VerifyPaymentRequest> for VerifiedCheckout {
    type Error = AppError;

    fn try_from(dto: VerifyPaymentRequest) -> Result<Self> {
        let order = dto.order_data;
        let payment_method = match order.payment_method.as_deref() {
            Some(raw) => raw.parse::<PaymentMethod>()?,
            None => PaymentMethod::Razorpay,
        };
        Ok(Self {
            gateway_order_id: dto.razorpay_order_id,
            payment_id: dto.razorpay_payment_id,
            signature: dto.razorpay_signature,
            customer: Customer {
                name: order.customer_name,
                email: order.customer_email,
                phone: order.customer_phone,
            },
            address: ShippingAddress {
                address: order.shipping_address,
                city: order.shipping_city,
                state: order.shipping_state,
                pincode: order.shipping_pincode,
            },
            items: order.items.into_iter().map(CartLine::from).collect(),
            payment_method,
            tax: Money::new(order.tax_amount.unwrap_or_default())?,
            discount: Money::new(order.discount_amount.unwrap_or_default())?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub order_number: String,
}

#[derive(Debug, Deserialize)]
pub struct ShippingQuoteRequest {
    pub weight: Decimal,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct ShippingQuoteResponse {
    pub weight: Decimal,
    pub shipping_cost: Decimal,
    pub rate_per_kg: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CustomOrderDto {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub project_type: String,
    pub description: String,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub gst_number: Option<String>,
}

impl TryFrom<CustomOrderDto> for CustomOrderRequest {
    type Error = AppError;

    fn try_from(dto: CustomOrderDto) -> Result<Self> {
        Ok(Self {
            name: dto.name,
            email: dto.email,
            phone: dto.phone,
            project_type: dto.project_type.parse::<ProjectType>()?,
            brief: dto.description,
            budget: dto.budget,
            gst_number: dto.gst_number,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CustomOrderResponse {
    pub success: bool,
    pub request_number: String,
    pub message: String,
}
