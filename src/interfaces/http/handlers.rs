use super::AppState;
use super::dtos::{
    CreateOrderRequest, CreateOrderResponse, CustomOrderDto, CustomOrderResponse, ProductQuery,
    ShippingQuoteRequest, ShippingQuoteResponse, StatusUpdateRequest, VerifyPaymentRequest,
    VerifyPaymentResponse,
};
use crate::application::checkout::CheckoutRequest;
use crate::application::intake::CustomOrderRequest;
use crate::domain::money::Money;
use crate::domain::order::OrderStatus;
use crate::domain::product::{Category, Product};
use crate::error::AppError;
use actix_web::{HttpResponse, web};
use rust_decimal::Decimal;
use tracing::instrument;

#[instrument(name = "handler::create_order", skip(state, body))]
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let request = CheckoutRequest::from(body.into_inner());
    let intent = state.checkout.create_payment_intent(request).await?;
    Ok(HttpResponse::Ok().json(CreateOrderResponse {
        success: true,
        order_id: intent.gateway_order_id,
        amount: intent.amount_minor,
        currency: intent.currency,
        key: intent.key_id,
    }))
}

#[instrument(name = "handler::verify_payment", skip(state, body))]
pub async fn verify_payment(
    state: web::Data<AppState>,
    body: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().try_into()?;
    let order_number = state.checkout.verify_and_record(request).await?;
    Ok(HttpResponse::Ok().json(VerifyPaymentResponse {
        success: true,
        order_number,
    }))
}

#[instrument(name = "handler::calculate_shipping", skip(state, body))]
pub async fn calculate_shipping(
    state: web::Data<AppState>,
    body: web::Json<ShippingQuoteRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    if req.weight <= Decimal::ZERO {
        return Err(AppError::Validation(
            "weight must be greater than 0".to_string(),
        ));
    }
    let rates = state.checkout.shipping_rates();
    let subtotal = Money::new(req.subtotal.unwrap_or_default())?;
    let charge = rates.quote(req.weight, subtotal)?;
    Ok(HttpResponse::Ok().json(ShippingQuoteResponse {
        weight: req.weight,
        shipping_cost: charge.value(),
        rate_per_kg: rates.rate_per_kg,
    }))
}

fn apply_catalog_query(mut products: Vec<Product>, query: &ProductQuery) -> Result<Vec<Product>, AppError> {
    products.retain(|p| p.in_stock);

    if let Some(category) = query.category.as_deref()
        && category != "all"
    {
        let category = category.parse::<Category>()?;
        products.retain(|p| p.category == category);
    }
    if query.featured.unwrap_or(false) {
        products.retain(|p| p.is_featured);
    }
    if let Some(needle) = query.search.as_deref() {
        let needle = needle.to_lowercase();
        products.retain(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
        });
    }

    match query.sort.as_deref() {
        Some("price-low") => products.sort_by(|a, b| a.price.cmp(&b.price)),
        Some("price-high") => products.sort_by(|a, b| b.price.cmp(&a.price)),
        Some("newest") => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        // Default: featured first, newest within each group.
        _ => products.sort_by(|a, b| {
            b.is_featured
                .cmp(&a.is_featured)
                .then_with(|| b.created_at.cmp(&a.created_at))
        }),
    }
    Ok(products)
}

#[instrument(name = "handler::list_products", skip(state))]
pub async fn list_products(
    state: web::Data<AppState>,
    query: web::Query<ProductQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let products = state.products.all().await?;
    let products = apply_catalog_query(products, &query)?;
    Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::get_product", skip(state))]
pub async fn get_product(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let product = state
        .products
        .get(&product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
    Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::submit_custom_order", skip(state, body))]
pub async fn submit_custom_order(
    state: web::Data<AppState>,
    body: web::Json<CustomOrderDto>,
) -> Result<HttpResponse, AppError> {
    let request: CustomOrderRequest = body.into_inner().try_into()?;
    let recorded = state.intake.submit(request).await?;
    Ok(HttpResponse::Created().json(CustomOrderResponse {
        success: true,
        request_number: recorded.request_number,
        message: "Custom order request received. We will contact you within 24 hours."
            .to_string(),
    }))
}

#[instrument(name = "handler::get_order", skip(state))]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order_number = path.into_inner();
    let order = state
        .orders
        .get(&order_number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_number}")))?;
    Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::update_order_status", skip(state, body))]
pub async fn update_order_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let order_number = path.into_inner();
    let next = body.status.parse::<OrderStatus>()?;
    let mut order = state
        .orders
        .get(&order_number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_number}")))?;
    order.transition(next)?;
    state.orders.update(order.clone()).await?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
