pub mod dtos;
pub mod handlers;
pub mod routes;

use crate::application::checkout::CheckoutService;
use crate::application::intake::IntakeService;
use crate::domain::ports::{OrderStoreRef, ProductStoreRef};
use crate::error::AppError;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::sync::Arc;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub checkout: Arc<CheckoutService>,
    pub intake: Arc<IntakeService>,
    pub products: ProductStoreRef,
    pub orders: OrderStoreRef,
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        // Full detail always goes to the log; clients get the taxonomy view.
        tracing::error!(application_error = %self, "responding with error");
        match self {
            AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m})),
            AppError::SignatureMismatch => HttpResponse::BadRequest()
                .json(json!({"error": "payment signature verification failed"})),
            AppError::Gateway(m) => HttpResponse::BadGateway().json(json!({"error": m})),
            AppError::DuplicatePayment { order_number, .. } => HttpResponse::Conflict()
                .json(json!({"error": "payment already recorded", "order_number": order_number})),
            AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
            AppError::Config(_) => HttpResponse::InternalServerError()
                .json(json!({"error": "configuration issue"})),
            AppError::Storage(_) | AppError::Serde(_) | AppError::Csv(_) | AppError::Io(_) => {
                HttpResponse::InternalServerError()
                    .json(json!({"error": "an internal error occurred"}))
            }
        }
    }
}
