use crate::domain::money::Amount;
use crate::domain::ports::{GatewayOrder, PaymentGateway};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";

/// Computes the hex-encoded callback signature over `"{order_id}|{payment_id}"`.
///
/// Exposed so tests and webhook simulators can produce valid callbacks.
pub fn signature(secret: &str, order_id: &str, payment_id: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::Gateway("invalid gateway secret".to_string()))?;
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    payment_capture: u8,
}

#[derive(Deserialize)]
struct CreateOrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

/// Razorpay REST client.
///
/// Order creation goes over HTTP with basic auth; signature verification is
/// local HMAC-SHA256 with the shared secret, compared in constant time.
pub struct RazorpayGateway {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    pub fn new(key_id: String, key_secret: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            key_id,
            key_secret,
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        amount: Amount,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder> {
        let body = CreateOrderBody {
            amount: amount.to_minor_units()?,
            currency,
            receipt,
            payment_capture: 1,
        };

        let response = self
            .http
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("order creation request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Gateway(format!(
                "gateway rejected order creation ({status}): {detail}"
            )));
        }

        let created: CreateOrderResponse = response
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("malformed gateway response: {e}")))?;

        Ok(GatewayOrder {
            id: created.id,
            amount_minor: created.amount,
            currency: created.currency,
        })
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, supplied: &str) -> Result<()> {
        let supplied_bytes =
            hex::decode(supplied).map_err(|_| AppError::SignatureMismatch)?;
        let mut mac = HmacSha256::new_from_slice(self.key_secret.as_bytes())
            .map_err(|_| AppError::Gateway("invalid gateway secret".to_string()))?;
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        // verify_slice is constant-time.
        mac.verify_slice(&supplied_bytes)
            .map_err(|_| AppError::SignatureMismatch)
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}
