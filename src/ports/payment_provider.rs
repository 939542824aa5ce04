//! Payment provider port for external payment processing.
//!
//! Defines the contract every payment network adapter implements (Stripe for
//! cards, NOWPayments for crypto). Callers create payments and poll their
//! status through this trait without knowing which network is behind it.
//!
//! # Design
//!
//! - **Gateway agnostic**: one request shape in, one details shape out
//! - **Normalized status**: adapters translate native statuses into `UnifiedPaymentStatus`
//! - **No hidden retries**: a failed provider call surfaces as `PaymentError`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;
use crate::domain::payment::{ProviderKind, ProviderPaymentCreateRequest, ProviderPaymentDetails};

/// Port for payment provider integrations.
///
/// Implementations are stateless with respect to payments and safe to share
/// across tasks. They do not serialize concurrent status updates for the same
/// payment; that is the caller's job.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Which network this provider talks to.
    fn kind(&self) -> ProviderKind;

    /// Start a new payment.
    ///
    /// Calling this twice for the same logical purchase creates two payments
    /// unless the caller supplies an `order_id`.
    async fn create_payment(
        &self,
        request: ProviderPaymentCreateRequest,
    ) -> Result<ProviderPaymentDetails, PaymentError>;

    /// Re-fetch the current state of a payment. Read-only, safe to repeat.
    async fn get_payment_status(
        &self,
        provider_payment_id: &str,
    ) -> Result<ProviderPaymentDetails, PaymentError>;

    /// Whether this provider can charge in `currency` (case-insensitive).
    async fn supports_currency(&self, currency: &str) -> Result<bool, PaymentError>;
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    /// Create a card declined error.
    pub fn card_declined(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::CardDeclined, message)
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(
            PaymentErrorCode::NotFound,
            format!("{} not found", resource),
        )
    }

    /// Create an unsupported currency error.
    pub fn unsupported_currency(provider: ProviderKind, currency: &str) -> Self {
        Self::new(
            PaymentErrorCode::UnsupportedCurrency,
            format!("{} does not support currency '{}'", provider, currency),
        )
    }

    /// Create a provider-not-configured error.
    pub fn provider_not_configured(provider: ProviderKind) -> Self {
        Self::new(
            PaymentErrorCode::ProviderNotConfigured,
            format!("No {} provider is configured", provider),
        )
    }

    /// Create a missing order id error.
    pub fn missing_order_id() -> Self {
        Self::new(
            PaymentErrorCode::MissingOrderId,
            "order_id is required for this provider",
        )
    }

    /// Create a generic provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<ValidationError> for PaymentError {
    fn from(err: ValidationError) -> Self {
        PaymentError::invalid_request(err.to_string())
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Card was declined.
    CardDeclined,

    /// Insufficient funds.
    InsufficientFunds,

    /// Request rejected before reaching the provider, or by the provider as malformed.
    InvalidRequest,

    /// Resource not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Provider cannot charge in the requested currency.
    UnsupportedCurrency,

    /// No provider registered for the requested payment method.
    ProviderNotConfigured,

    /// Caller must supply an order id.
    MissingOrderId,

    /// Provider API error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError
                | PaymentErrorCode::RateLimitExceeded
                | PaymentErrorCode::ProviderError
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::CardDeclined => "card_declined",
            PaymentErrorCode::InsufficientFunds => "insufficient_funds",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::UnsupportedCurrency => "unsupported_currency",
            PaymentErrorCode::ProviderNotConfigured => "provider_not_configured",
            PaymentErrorCode::MissingOrderId => "missing_order_id",
            PaymentErrorCode::ProviderError => "provider_error",
            PaymentErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Classifies a failed HTTP response into an error code.
///
/// `provider_code` is the provider's own machine-readable code, when present.
pub fn classify_http_failure(status: u16, provider_code: Option<&str>) -> PaymentErrorCode {
    match (status, provider_code) {
        (_, Some("insufficient_funds")) => PaymentErrorCode::InsufficientFunds,
        (402, _) | (_, Some("card_declined")) => PaymentErrorCode::CardDeclined,
        (401 | 403, _) => PaymentErrorCode::AuthenticationError,
        (404, _) => PaymentErrorCode::NotFound,
        (429, _) => PaymentErrorCode::RateLimitExceeded,
        (400..=499, _) => PaymentErrorCode::InvalidRequest,
        (500..=599, _) => PaymentErrorCode::ProviderError,
        _ => PaymentErrorCode::Unknown,
    }
}
