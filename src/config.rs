use crate::domain::money::Money;
use crate::domain::shipping::ShippingRates;
use crate::error::{AppError, Result};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyMode {
    Queued,
    Direct,
}

impl FromStr for NotifyMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "queued" => Ok(Self::Queued),
            "direct" => Ok(Self::Direct),
            other => Err(AppError::Config(format!(
                "NOTIFY_MODE must be 'queued' or 'direct', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,

    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,
    pub razorpay_base_url: String,
    pub currency: String,

    pub company_email: String,
    pub shipping: ShippingRates,
    pub notify_mode: NotifyMode,

    /// When set, gateway error detail is passed through to API clients
    /// instead of a generic message. Never enable in production.
    pub debug_errors: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let required = |name: &str| {
            env::var(name)
                .map_err(|_| AppError::Config(format!("missing environment variable '{name}'")))
        };
        let or_default = |name: &str, default: &str| {
            env::var(name).unwrap_or_else(|_| default.to_string())
        };
        let decimal = |name: &str, default: &str| -> Result<Decimal> {
            let raw = or_default(name, default);
            Decimal::from_str(&raw)
                .map_err(|e| AppError::Config(format!("invalid {name} '{raw}': {e}")))
        };

        let server_host = or_default("SERVER_HOST", "127.0.0.1");
        let server_port = or_default("SERVER_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("invalid SERVER_PORT: {e}")))?;

        let razorpay_key_id = required("RAZORPAY_KEY_ID")?;
        let razorpay_key_secret = required("RAZORPAY_KEY_SECRET")?;
        let razorpay_base_url = or_default(
            "RAZORPAY_BASE_URL",
            crate::infrastructure::razorpay::DEFAULT_BASE_URL,
        );
        let currency = or_default("STORE_CURRENCY", "INR");
        let company_email = or_default("COMPANY_EMAIL", "studio@kilnstore.example");

        let shipping = ShippingRates {
            rate_per_kg: decimal("SHIPPING_RATE_PER_KG", "50")?,
            minimum_charge: Money::new(decimal("SHIPPING_MINIMUM_CHARGE", "100")?)
                .map_err(|_| AppError::Config("SHIPPING_MINIMUM_CHARGE must not be negative".to_string()))?,
            free_shipping_threshold: Money::new(decimal("FREE_SHIPPING_THRESHOLD", "5000")?)
                .map_err(|_| AppError::Config("FREE_SHIPPING_THRESHOLD must not be negative".to_string()))?,
        };

        let notify_mode = or_default("NOTIFY_MODE", "queued").parse::<NotifyMode>()?;
        let debug_errors = or_default("DEBUG_ERRORS", "false")
            .parse::<bool>()
            .map_err(|e| AppError::Config(format!("invalid DEBUG_ERRORS value: {e}")))?;

        tracing::info!(
            host = %server_host,
            port = server_port,
            notify_mode = ?notify_mode,
            "configuration loaded"
        );

        Ok(Self {
            server_host,
            server_port,
            razorpay_key_id,
            razorpay_key_secret,
            razorpay_base_url,
            currency,
            company_email,
            shipping,
            notify_mode,
            debug_errors,
        })
    }
}
