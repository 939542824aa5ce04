//! Payment provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::nowpayments::DEFAULT_NOWPAYMENTS_API_BASE_URL;
use crate::adapters::stripe::DEFAULT_STRIPE_API_BASE_URL;

/// Payment configuration (Stripe and NOWPayments)
///
/// Each provider is optional; a provider whose key is absent is simply not
/// registered with the router.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret key (`sk_test_...` / `sk_live_...`)
    #[serde(default)]
    pub stripe_secret_key: Option<String>,

    #[serde(default = "default_stripe_api_base_url")]
    pub stripe_api_base_url: String,

    /// NOWPayments API key
    #[serde(default)]
    pub nowpayments_api_key: Option<String>,

    #[serde(default = "default_nowpayments_api_base_url")]
    pub nowpayments_api_base_url: String,

    /// IPN callback URL sent with every crypto payment
    #[serde(default)]
    pub nowpayments_webhook_url: Option<String>,

    /// Lifetime of the cached NOWPayments currency list, in seconds
    #[serde(default = "default_currency_cache_secs")]
    pub nowpayments_currency_cache_secs: u64,

    /// Reject crypto payments without an order id
    #[serde(default)]
    pub require_order_id: bool,
}

fn default_stripe_api_base_url() -> String {
    DEFAULT_STRIPE_API_BASE_URL.to_string()
}

fn default_nowpayments_api_base_url() -> String {
    DEFAULT_NOWPAYMENTS_API_BASE_URL.to_string()
}

fn default_currency_cache_secs() -> u64 {
    3600
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_secret_key: None,
            stripe_api_base_url: default_stripe_api_base_url(),
            nowpayments_api_key: None,
            nowpayments_api_base_url: default_nowpayments_api_base_url(),
            nowpayments_webhook_url: None,
            nowpayments_currency_cache_secs: default_currency_cache_secs(),
            require_order_id: false,
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

impl PaymentConfig {
    pub fn stripe_enabled(&self) -> bool {
        self.stripe_secret_key.is_some()
    }

    pub fn nowpayments_enabled(&self) -> bool {
        self.nowpayments_api_key.is_some()
    }

    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_secret_key
            .as_deref()
            .is_some_and(|key| key.starts_with("sk_test_"))
    }

    pub fn currency_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.nowpayments_currency_cache_secs)
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.stripe_enabled() && !self.nowpayments_enabled() {
            return Err(ValidationError::NoProviderConfigured);
        }

        if let Some(key) = &self.stripe_secret_key {
            // Publishable keys (pk_) must never reach the server side
            if !key.starts_with("sk_") {
                return Err(ValidationError::InvalidStripeKey);
            }
            if !is_http_url(&self.stripe_api_base_url) {
                return Err(ValidationError::InvalidUrl("STRIPE_API_BASE_URL"));
            }
        }

        if let Some(key) = &self.nowpayments_api_key {
            if key.trim().is_empty() {
                return Err(ValidationError::MissingRequired("NOWPAYMENTS_API_KEY"));
            }
            let webhook_url = self
                .nowpayments_webhook_url
                .as_deref()
                .ok_or(ValidationError::MissingRequired("NOWPAYMENTS_WEBHOOK_URL"))?;
            if !is_http_url(webhook_url) {
                return Err(ValidationError::InvalidUrl("NOWPAYMENTS_WEBHOOK_URL"));
            }
            if !is_http_url(&self.nowpayments_api_base_url) {
                return Err(ValidationError::InvalidUrl("NOWPAYMENTS_API_BASE_URL"));
            }
            if self.nowpayments_currency_cache_secs == 0 {
                return Err(ValidationError::InvalidCacheTtl);
            }
        }

        Ok(())
    }
}
