//! Stripe API object types.
//!
//! These types represent Stripe objects as they arrive in API responses.
//! Only the fields the adapter reads are modelled; the full body is kept
//! separately as raw JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ════════════════════════════════════════════════════════════════════════════════
// Payment Objects
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe PaymentIntent object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePaymentIntent {
    /// Unique identifier (pi_...).
    pub id: String,

    /// Amount in minor units.
    pub amount: i64,

    /// Three-letter ISO currency code, lowercase.
    pub currency: String,

    /// Native status (requires_payment_method, processing, succeeded, ...).
    pub status: String,

    /// Secret for client-side confirmation.
    pub client_secret: Option<String>,

    /// Customer ID, if attached.
    pub customer: Option<String>,

    /// Payment method ID, if attached.
    pub payment_method: Option<String>,

    pub description: Option<String>,

    /// Unix timestamp of creation.
    pub created: i64,

    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Stripe SetupIntent object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSetupIntent {
    /// Unique identifier (seti_...).
    pub id: String,

    pub status: String,

    pub client_secret: Option<String>,

    pub customer: Option<String>,

    pub payment_method: Option<String>,

    /// `off_session` or `on_session`.
    pub usage: Option<String>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Stripe PaymentMethod object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePaymentMethod {
    /// Unique identifier (pm_...).
    pub id: String,

    /// Payment method type (card, sepa_debit, ...).
    #[serde(rename = "type")]
    pub method_type: String,

    pub customer: Option<String>,

    pub card: Option<StripeCard>,
}

/// Card details on a PaymentMethod.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StripeCard {
    pub brand: String,
    pub last4: String,
    pub exp_month: u32,
    pub exp_year: u32,
}

/// Stripe Customer object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCustomer {
    /// Unique customer identifier (cus_...).
    pub id: String,

    pub email: Option<String>,

    pub name: Option<String>,

    /// Unix timestamp of creation.
    pub created: i64,

    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════════

/// Error envelope returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorBody {
    pub error: StripeApiError,
}

/// Stripe error details.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    /// card_error, invalid_request_error, api_error, ...
    #[serde(rename = "type")]
    pub error_type: Option<String>,

    pub code: Option<String>,

    /// Issuer decline reason for card errors.
    pub decline_code: Option<String>,

    pub message: Option<String>,
}

impl StripeApiError {
    /// The most specific machine-readable code available.
    pub fn most_specific_code(&self) -> Option<&str> {
        self.decline_code.as_deref().or(self.code.as_deref())
    }
}
