//! Payment creation request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::metadata::Metadata;
use crate::domain::foundation::{UserId, ValidationError};

/// Caller-constructed request to start a payment with any provider.
///
/// `order_id` is the caller's correlation and idempotency key. `customer_id`
/// is only meaningful to card providers that keep saved customers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderPaymentCreateRequest {
    pub user_id: UserId,

    /// Amount in major units of `price_currency`.
    pub amount: f64,

    /// Currency the customer is charged in.
    pub price_currency: String,

    /// Currency actually transferred. Equals `price_currency` for card payments.
    pub pay_currency: String,

    pub description: Option<String>,

    pub order_id: Option<String>,

    pub customer_id: Option<String>,

    #[serde(default)]
    pub metadata: Metadata,
}

impl ProviderPaymentCreateRequest {
    /// Creates a request charged and paid in the same currency.
    pub fn new(user_id: UserId, amount: f64, currency: impl Into<String>) -> Self {
        let currency = currency.into();
        Self {
            user_id,
            amount,
            pay_currency: currency.clone(),
            price_currency: currency,
            description: None,
            order_id: None,
            customer_id: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_pay_currency(mut self, currency: impl Into<String>) -> Self {
        self.pay_currency = currency.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    /// Adds a single metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Rejects requests no provider could accept.
    ///
    /// Sub-cent precision is not an error; it is rounded by card adapters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ValidationError::invalid_format(
                "amount",
                format!("must be a positive finite number, got {}", self.amount),
            ));
        }
        if self.price_currency.trim().is_empty() {
            return Err(ValidationError::empty_field("price_currency"));
        }
        if self.pay_currency.trim().is_empty() {
            return Err(ValidationError::empty_field("pay_currency"));
        }
        if matches!(&self.order_id, Some(id) if id.trim().is_empty()) {
            return Err(ValidationError::empty_field("order_id"));
        }
        Ok(())
    }
}
