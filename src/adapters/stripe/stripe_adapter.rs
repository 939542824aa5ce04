//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait for card payments over the Stripe
//! PaymentIntents API. Saved-card operations used for auto-renewal live in
//! `saved_cards`.
//!
//! # Wire format
//!
//! - Form-encoded requests, HTTP basic auth with the secret key
//! - Pinned API version (`Stripe-Version: 2024-06-20`)
//! - Amounts always in integer minor units
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(secret_key);
//! let provider = StripeProvider::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::adapters::http_json;
use crate::domain::payment::metadata::{coerce_metadata, wants_auto_renew};
use crate::domain::payment::money::{from_minor_units, to_minor_units};
use crate::domain::payment::{
    usd_amount, Metadata, ProviderKind, ProviderPaymentCreateRequest, ProviderPaymentDetails,
};
use crate::domain::foundation::UserId;
use crate::ports::{classify_http_failure, PaymentError, PaymentProvider};

use super::status::{is_supported_currency, map_stripe_status};
use super::stripe_types::{StripeErrorBody, StripePaymentIntent};

/// Stripe API version every request is pinned to.
pub const STRIPE_API_VERSION: &str = "2024-06-20";

/// Default Stripe API base URL.
pub const DEFAULT_STRIPE_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    secret_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: SecretString::new(secret_key.into()),
            api_base_url: DEFAULT_STRIPE_API_BASE_URL.to_string(),
        }
    }

    /// Create configuration from the `STRIPE_SECRET_KEY` environment variable.
    pub fn from_env() -> Result<Self, std::env::VarError> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")?;
        Ok(Self::new(secret_key))
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Whether the key is a test-mode key.
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.expose_secret().starts_with("sk_test_")
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_base_url", &self.api_base_url)
            .field("test_mode", &self.is_test_mode())
            .finish()
    }
}

/// Stripe payment provider adapter.
///
/// Stateless apart from the pooled HTTP client; share it behind an `Arc`.
pub struct StripeProvider {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeProvider {
    /// Create a new Stripe adapter with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Create an adapter reusing an existing HTTP client.
    pub fn with_http_client(config: StripeConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    /// Authenticated GET request.
    pub(super) fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .get(self.url(path))
            .basic_auth(self.config.secret_key.expose_secret(), Option::<&str>::None)
            .header("Stripe-Version", STRIPE_API_VERSION)
    }

    /// Authenticated form POST, with an idempotency key when one is given.
    pub(super) fn post_form(
        &self,
        path: &str,
        form: &[(String, String)],
        idempotency_key: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let request = self
            .http_client
            .post(self.url(path))
            .basic_auth(self.config.secret_key.expose_secret(), Option::<&str>::None)
            .header("Stripe-Version", STRIPE_API_VERSION)
            .form(form);

        match idempotency_key {
            Some(key) => request.header("Idempotency-Key", key),
            None => request,
        }
    }

    /// Execute a request and return the raw JSON body.
    pub(super) async fn execute(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, PaymentError> {
        http_json::execute(ProviderKind::Stripe, operation, request, stripe_error).await
    }

    /// Execute a request returning a PaymentIntent and normalize it.
    pub(super) async fn execute_intent(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<ProviderPaymentDetails, PaymentError> {
        let raw = self.execute(operation, request).await?;
        let intent: StripePaymentIntent = http_json::decode(ProviderKind::Stripe, &raw)?;
        Ok(details_from_intent(intent, raw))
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Stripe
    }

    async fn create_payment(
        &self,
        request: ProviderPaymentCreateRequest,
    ) -> Result<ProviderPaymentDetails, PaymentError> {
        request.validate()?;
        if !is_supported_currency(&request.price_currency) {
            return Err(PaymentError::unsupported_currency(
                ProviderKind::Stripe,
                &request.price_currency,
            ));
        }
        ensure_chargeable(request.amount)?;

        let form = payment_intent_form(&request);
        let idempotency_key = request.order_id.as_deref().map(payment_idempotency_key);

        let details = self
            .execute_intent(
                "create_payment_intent",
                self.post_form("/v1/payment_intents", &form, idempotency_key.as_deref()),
            )
            .await?;

        tracing::info!(
            payment_intent = %details.provider_payment_id,
            user_id = %request.user_id,
            order_id = request.order_id.as_deref().unwrap_or(""),
            amount = details.amount,
            currency = %details.price_currency,
            status = %details.normalized_status,
            "Stripe payment intent created"
        );

        Ok(details)
    }

    async fn get_payment_status(
        &self,
        provider_payment_id: &str,
    ) -> Result<ProviderPaymentDetails, PaymentError> {
        let id = http_json::path_id("payment_intent", provider_payment_id)?;
        let details = self
            .execute_intent(
                "retrieve_payment_intent",
                self.get(&format!("/v1/payment_intents/{}", id)),
            )
            .await?;

        tracing::debug!(
            payment_intent = %details.provider_payment_id,
            status = %details.provider_status,
            "Stripe payment intent retrieved"
        );

        Ok(details)
    }

    async fn supports_currency(&self, currency: &str) -> Result<bool, PaymentError> {
        Ok(is_supported_currency(currency))
    }
}

/// Idempotency key for on-session PaymentIntent creation derived from the caller's order id.
pub fn payment_idempotency_key(order_id: &str) -> String {
    format!("payment-{}", order_id)
}

/// Idempotency key for off-session charges. Kept apart from
/// `payment_idempotency_key` so a renewal never replays the purchase intent.
pub fn off_session_idempotency_key(order_id: &str) -> String {
    format!("off-session-{}", order_id)
}

/// Rejects amounts that are positive but round to zero minor units.
pub(super) fn ensure_chargeable(amount: f64) -> Result<(), PaymentError> {
    if to_minor_units(amount) <= 0 {
        return Err(PaymentError::invalid_request(format!(
            "amount {} is below the smallest chargeable unit",
            amount
        )));
    }
    Ok(())
}

/// Metadata sent to Stripe: caller values coerced to strings, plus our correlation keys.
pub fn stripe_metadata(
    user_id: &UserId,
    order_id: Option<&str>,
    metadata: &Metadata,
) -> BTreeMap<String, String> {
    let mut coerced = coerce_metadata(metadata);
    coerced.insert("user_id".to_string(), user_id.to_string());
    if let Some(order_id) = order_id {
        coerced.insert("order_id".to_string(), order_id.to_string());
    }
    coerced
}

/// Appends `metadata[key]=value` pairs to a form.
pub(super) fn push_metadata(form: &mut Vec<(String, String)>, metadata: BTreeMap<String, String>) {
    form.extend(
        metadata
            .into_iter()
            .map(|(key, value)| (format!("metadata[{}]", key), value)),
    );
}

/// Form body for `POST /v1/payment_intents`.
pub fn payment_intent_form(request: &ProviderPaymentCreateRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_string(), to_minor_units(request.amount).to_string()),
        ("currency".to_string(), request.price_currency.to_lowercase()),
        ("payment_method_types[]".to_string(), "card".to_string()),
    ];

    if let Some(description) = &request.description {
        form.push(("description".to_string(), description.clone()));
    }

    if let Some(customer_id) = &request.customer_id {
        form.push(("customer".to_string(), customer_id.clone()));
    }

    if wants_auto_renew(&request.metadata) {
        form.push(("setup_future_usage".to_string(), "off_session".to_string()));
    }

    push_metadata(
        &mut form,
        stripe_metadata(&request.user_id, request.order_id.as_deref(), &request.metadata),
    );

    form
}

/// Normalizes a PaymentIntent into provider-agnostic details.
pub fn details_from_intent(intent: StripePaymentIntent, raw: Value) -> ProviderPaymentDetails {
    let amount = from_minor_units(intent.amount);
    let currency = intent.currency.to_lowercase();
    let normalized_status = map_stripe_status(&intent.status);

    ProviderPaymentDetails {
        provider: ProviderKind::Stripe,
        provider_payment_id: intent.id,
        provider_status: intent.status,
        normalized_status,
        amount,
        amount_usd: usd_amount(amount, &currency),
        price_currency: currency.clone(),
        pay_currency: currency,
        pay_amount: None,
        pay_address: None,
        expires_at: None,
        client_secret: intent.client_secret,
        metadata: intent
            .metadata
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
        raw,
    }
}

/// Decodes a Stripe error response.
fn stripe_error(status: u16, body: &str) -> PaymentError {
    match serde_json::from_str::<StripeErrorBody>(body) {
        Ok(parsed) => {
            let provider_code = parsed.error.most_specific_code().map(str::to_string);
            let code = classify_http_failure(status, provider_code.as_deref());
            let message = parsed
                .error
                .message
                .unwrap_or_else(|| format!("Stripe API error (HTTP {})", status));
            let err = PaymentError::new(code, message);
            match provider_code {
                Some(provider_code) => err.with_provider_code(provider_code),
                None => err,
            }
        }
        Err(_) => PaymentError::new(
            classify_http_failure(status, None),
            format!("Stripe API error (HTTP {}): {}", status, body),
        ),
    }
}
