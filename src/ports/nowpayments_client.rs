//! NOWPayments client port.
//!
//! The crypto adapter talks to NOWPayments through this trait so the HTTP
//! transport (and its currency cache) can be swapped or faked.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::PaymentError;

/// Port for the NOWPayments API.
#[async_trait]
pub trait NowPaymentsClient: Send + Sync {
    /// `POST /payment`
    async fn create_payment(
        &self,
        request: NowPaymentsCreatePayment,
    ) -> Result<NowPaymentsPayment, PaymentError>;

    /// `GET /payment/{id}`
    async fn get_payment_status(&self, payment_id: &str) -> Result<NowPaymentsPayment, PaymentError>;

    /// Whether `currency` is in the provider's supported list (case-insensitive).
    async fn is_currency_supported(&self, currency: &str) -> Result<bool, PaymentError>;
}

/// Body of `POST /payment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPaymentsCreatePayment {
    pub price_amount: f64,
    pub price_currency: String,
    pub pay_currency: String,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipn_callback_url: Option<String>,
}

/// Payment object as returned by `POST /payment` and `GET /payment/{id}`.
///
/// `raw` is not part of the wire format; transports fill it with the
/// untouched response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPaymentsPayment {
    #[serde(deserialize_with = "string_or_number")]
    pub payment_id: String,
    pub payment_status: String,
    #[serde(default)]
    pub pay_address: Option<String>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub price_amount: Option<f64>,
    #[serde(default)]
    pub price_currency: Option<String>,
    #[serde(default, deserialize_with = "opt_f64_lenient")]
    pub pay_amount: Option<f64>,
    #[serde(default)]
    pub pay_currency: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub order_description: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip)]
    pub raw: Value,
}

/// The API sends ids as strings on creation and as numbers on lookup.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Amounts occasionally arrive as numeric strings.
fn opt_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => s
            .parse::<f64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid amount '{}': {}", s, e))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected number, got {}",
            other
        ))),
    }
}
