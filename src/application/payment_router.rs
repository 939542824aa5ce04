//! PaymentRouter - picks a provider for a payment and dispatches to it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::adapters::nowpayments::{
    NowPaymentsHttpClient, NowPaymentsHttpConfig, NowPaymentsProvider, NowPaymentsProviderConfig,
};
use crate::adapters::stripe::{StripeConfig, StripeProvider};
use crate::config::{PaymentConfig, ValidationError};
use crate::domain::payment::{ProviderKind, ProviderPaymentCreateRequest, ProviderPaymentDetails};
use crate::ports::{PaymentError, PaymentProvider};

/// How the customer wants to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Crypto,
}

impl PaymentMethod {
    /// Provider that handles this method.
    pub fn provider_kind(&self) -> ProviderKind {
        match self {
            PaymentMethod::Card => ProviderKind::Stripe,
            PaymentMethod::Crypto => ProviderKind::NowPayments,
        }
    }

    /// The currency a provider must support for this method.
    ///
    /// Card payments are charged in the price currency; crypto payments are
    /// priced in fiat and settled in `pay_currency`.
    pub fn routing_currency<'a>(&self, request: &'a ProviderPaymentCreateRequest) -> &'a str {
        match self {
            PaymentMethod::Card => &request.price_currency,
            PaymentMethod::Crypto => &request.pay_currency,
        }
    }
}

/// Registry of configured providers, keyed by kind.
#[derive(Default, Clone)]
pub struct PaymentRouter {
    providers: HashMap<ProviderKind, Arc<dyn PaymentProvider>>,
}

impl PaymentRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider` under its own kind, replacing any previous one.
    pub fn register(&mut self, provider: Arc<dyn PaymentProvider>) {
        self.providers.insert(provider.kind(), provider);
    }

    pub fn with_provider(mut self, provider: Arc<dyn PaymentProvider>) -> Self {
        self.register(provider);
        self
    }

    /// Builds the HTTP-backed providers enabled in `config`.
    pub fn from_config(config: &PaymentConfig) -> Result<Self, ValidationError> {
        config.validate()?;

        let http_client = reqwest::Client::new();
        let mut router = Self::new();

        if let Some(secret_key) = &config.stripe_secret_key {
            let stripe_config = StripeConfig::new(secret_key.clone())
                .with_base_url(config.stripe_api_base_url.clone());
            router.register(Arc::new(StripeProvider::with_http_client(
                stripe_config,
                http_client.clone(),
            )));
        }

        if let Some(api_key) = &config.nowpayments_api_key {
            let webhook_url = config
                .nowpayments_webhook_url
                .clone()
                .ok_or(ValidationError::MissingRequired("NOWPAYMENTS_WEBHOOK_URL"))?;
            let client = NowPaymentsHttpClient::with_http_client(
                NowPaymentsHttpConfig::new(api_key.clone())
                    .with_base_url(config.nowpayments_api_base_url.clone())
                    .with_currency_cache_ttl(config.currency_cache_ttl()),
                http_client,
            );
            router.register(Arc::new(NowPaymentsProvider::new(
                Arc::new(client),
                NowPaymentsProviderConfig::new(webhook_url)
                    .with_required_order_id(config.require_order_id),
            )));
        }

        tracing::info!(
            stripe = router.is_registered(ProviderKind::Stripe),
            nowpayments = router.is_registered(ProviderKind::NowPayments),
            "Payment router configured"
        );

        Ok(router)
    }

    pub fn is_registered(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    /// Provider registered for `kind`.
    pub fn provider(&self, kind: ProviderKind) -> Result<Arc<dyn PaymentProvider>, PaymentError> {
        self.providers
            .get(&kind)
            .cloned()
            .ok_or_else(|| PaymentError::provider_not_configured(kind))
    }

    /// Provider for `method` that supports `currency`.
    pub async fn select(
        &self,
        method: PaymentMethod,
        currency: &str,
    ) -> Result<Arc<dyn PaymentProvider>, PaymentError> {
        let kind = method.provider_kind();
        let provider = self.provider(kind)?;

        if !provider.supports_currency(currency).await? {
            return Err(PaymentError::unsupported_currency(kind, currency));
        }

        Ok(provider)
    }

    /// Selects a provider for `method` and creates the payment with it.
    pub async fn create_payment(
        &self,
        method: PaymentMethod,
        request: ProviderPaymentCreateRequest,
    ) -> Result<ProviderPaymentDetails, PaymentError> {
        let provider = self
            .select(method, method.routing_currency(&request))
            .await?;
        provider.create_payment(request).await
    }

    /// Fetches the current state of a payment from the provider that created it.
    pub async fn get_payment_status(
        &self,
        kind: ProviderKind,
        provider_payment_id: &str,
    ) -> Result<ProviderPaymentDetails, PaymentError> {
        self.provider(kind)?
            .get_payment_status(provider_payment_id)
            .await
    }
}
