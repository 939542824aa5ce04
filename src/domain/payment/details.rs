//! Normalized payment details returned by every provider.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::kind::ProviderKind;
use super::metadata::Metadata;
use super::status::UnifiedPaymentStatus;
use crate::domain::foundation::Timestamp;

/// Provider response normalized into one shape.
///
/// Built fresh on every call; the caller owns persistence of
/// `provider_payment_id` and `normalized_status`. Optional fields signal
/// provider capability: `pay_address` is set by crypto providers,
/// `client_secret` by card providers needing client-side confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderPaymentDetails {
    pub provider: ProviderKind,

    /// Opaque provider id; the key for later `get_payment_status` calls.
    pub provider_payment_id: String,

    /// Status exactly as the provider reported it.
    pub provider_status: String,

    pub normalized_status: UnifiedPaymentStatus,

    pub amount: f64,
    pub price_currency: String,
    pub pay_currency: String,

    /// Equal to `amount` when the price currency is USD. No conversion is performed.
    pub amount_usd: Option<f64>,

    pub pay_amount: Option<f64>,
    pub pay_address: Option<String>,

    /// After this point a still-pending payment counts as abandoned.
    pub expires_at: Option<Timestamp>,

    pub client_secret: Option<String>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Verbatim provider response, for debugging only.
    #[serde(default)]
    pub raw: Value,
}

impl ProviderPaymentDetails {
    /// Returns true if the payment is still in flight but past its deadline.
    pub fn is_abandoned(&self, now: &Timestamp) -> bool {
        match &self.expires_at {
            Some(expires_at) => self.normalized_status.is_in_flight() && expires_at.is_before(now),
            None => false,
        }
    }
}

/// `Some(amount)` when `price_currency` is USD, otherwise `None`.
pub fn usd_amount(amount: f64, price_currency: &str) -> Option<f64> {
    price_currency.eq_ignore_ascii_case("usd").then_some(amount)
}
