//! reqwest transport for the NOWPayments API.
//!
//! Authenticates with the `x-api-key` header. The supported-currency list is
//! fetched lazily and cached for a configurable TTL.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::adapters::http_json;
use crate::domain::payment::ProviderKind;
use crate::ports::{
    classify_http_failure, NowPaymentsClient, NowPaymentsCreatePayment, NowPaymentsPayment,
    PaymentError,
};

/// Default NOWPayments API base URL.
pub const DEFAULT_NOWPAYMENTS_API_BASE_URL: &str = "https://api.nowpayments.io/v1";

/// Default lifetime of the cached currency list.
pub const DEFAULT_CURRENCY_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// NOWPayments API configuration.
#[derive(Clone)]
pub struct NowPaymentsHttpConfig {
    api_key: SecretString,
    api_base_url: String,
    currency_cache_ttl: Duration,
    request_timeout: Duration,
}

impl NowPaymentsHttpConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: DEFAULT_NOWPAYMENTS_API_BASE_URL.to_string(),
            currency_cache_ttl: DEFAULT_CURRENCY_CACHE_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_currency_cache_ttl(mut self, ttl: Duration) -> Self {
        self.currency_cache_ttl = ttl;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl std::fmt::Debug for NowPaymentsHttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NowPaymentsHttpConfig")
            .field("api_base_url", &self.api_base_url)
            .field("currency_cache_ttl", &self.currency_cache_ttl)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

struct CurrencyCache {
    codes: HashSet<String>,
    fetched_at: Instant,
}

impl CurrencyCache {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// `GET /currencies` response. Entries are plain codes, or objects when
/// the account has extended currency info enabled.
#[derive(Debug, Deserialize)]
struct CurrenciesResponse {
    currencies: Vec<CurrencyEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CurrencyEntry {
    Code(String),
    Detailed { code: String },
}

impl CurrencyEntry {
    fn into_code(self) -> String {
        match self {
            CurrencyEntry::Code(code) | CurrencyEntry::Detailed { code } => code.to_lowercase(),
        }
    }
}

/// NOWPayments error envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NowPaymentsErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP implementation of [`NowPaymentsClient`].
pub struct NowPaymentsHttpClient {
    config: NowPaymentsHttpConfig,
    http_client: reqwest::Client,
    currencies: RwLock<Option<CurrencyCache>>,
}

impl NowPaymentsHttpClient {
    pub fn new(config: NowPaymentsHttpConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    pub fn with_http_client(config: NowPaymentsHttpConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
            currencies: RwLock::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    /// Adds the API key and the request timeout.
    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("x-api-key", self.config.api_key.expose_secret())
            .timeout(self.config.request_timeout)
    }

    async fn execute_payment(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<NowPaymentsPayment, PaymentError> {
        let raw =
            http_json::execute(ProviderKind::NowPayments, operation, request, nowpayments_error)
                .await?;
        let mut payment: NowPaymentsPayment = http_json::decode(ProviderKind::NowPayments, &raw)?;
        payment.raw = raw;
        Ok(payment)
    }

    async fn fetch_currencies(&self) -> Result<HashSet<String>, PaymentError> {
        let raw = http_json::execute(
            ProviderKind::NowPayments,
            "list_currencies",
            self.authed(self.http_client.get(self.url("/currencies"))),
            nowpayments_error,
        )
        .await?;
        let response: CurrenciesResponse = http_json::decode(ProviderKind::NowPayments, &raw)?;
        Ok(response
            .currencies
            .into_iter()
            .map(CurrencyEntry::into_code)
            .collect())
    }
}

#[async_trait]
impl NowPaymentsClient for NowPaymentsHttpClient {
    async fn create_payment(
        &self,
        request: NowPaymentsCreatePayment,
    ) -> Result<NowPaymentsPayment, PaymentError> {
        self.execute_payment(
            "create_payment",
            self.authed(self.http_client.post(self.url("/payment")).json(&request)),
        )
        .await
    }

    async fn get_payment_status(&self, payment_id: &str) -> Result<NowPaymentsPayment, PaymentError> {
        let id = http_json::path_id("payment", payment_id)?;
        self.execute_payment(
            "get_payment_status",
            self.authed(self.http_client.get(self.url(&format!("/payment/{}", id)))),
        )
        .await
    }

    async fn is_currency_supported(&self, currency: &str) -> Result<bool, PaymentError> {
        let currency = currency.to_lowercase();
        let ttl = self.config.currency_cache_ttl;

        {
            let cache = self.currencies.read().await;
            if let Some(cache) = (*cache).as_ref().filter(|c| c.is_fresh(ttl)) {
                return Ok(cache.codes.contains(&currency));
            }
        }

        // No lock is held while fetching; concurrent refreshes just race to store.
        let codes = self.fetch_currencies().await?;
        tracing::debug!(count = codes.len(), "NOWPayments currency list refreshed");
        let supported = codes.contains(&currency);
        *self.currencies.write().await = Some(CurrencyCache {
            codes,
            fetched_at: Instant::now(),
        });
        Ok(supported)
    }
}

/// Decodes a NOWPayments error response.
fn nowpayments_error(status: u16, body: &str) -> PaymentError {
    let parsed = serde_json::from_str::<NowPaymentsErrorBody>(body).ok();
    let provider_code = parsed.as_ref().and_then(|b| b.code.clone());
    let message = parsed
        .and_then(|b| b.message)
        .unwrap_or_else(|| format!("NOWPayments returned HTTP {}", status));

    let error = PaymentError::new(classify_http_failure(status, None), message);
    match provider_code {
        Some(code) => error.with_provider_code(code),
        None => error,
    }
}
