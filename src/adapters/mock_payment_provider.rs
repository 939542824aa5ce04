//! Mock payment provider for testing.
//!
//! Provides a configurable mock implementation of `PaymentProvider` for unit
//! and integration tests. Supports:
//! - Pre-configured responses
//! - Error injection, globally or per method
//! - Call tracking
//! - Driving stored payments through status changes

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::payment::{
    usd_amount, ProviderKind, ProviderPaymentCreateRequest, ProviderPaymentDetails,
    UnifiedPaymentStatus,
};
use crate::ports::{PaymentError, PaymentProvider};

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new(ProviderKind::Stripe);
///
/// // Inject errors
/// mock.set_error(PaymentError::card_declined("Test decline"));
///
/// // Use in tests
/// let result = mock.create_payment(request).await;
/// assert!(mock.was_called("create_payment"));
/// ```
#[derive(Clone)]
pub struct MockPaymentProvider {
    kind: ProviderKind,
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Payments created so far, by provider id.
    payments: HashMap<String, ProviderPaymentDetails>,

    /// Details to return on the next `create_payment` call.
    next_details: Option<ProviderPaymentDetails>,

    /// Currencies reported as supported; `None` accepts everything.
    currencies: Option<HashSet<String>>,

    /// Error to return on next call.
    next_error: Option<PaymentError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, PaymentError>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentProvider {
    /// Mock that accepts every currency.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            inner: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Mock that only supports the given currencies (case-insensitive).
    pub fn with_currencies(kind: ProviderKind, currencies: &[&str]) -> Self {
        let mock = Self::new(kind);
        mock.state().currencies = Some(currencies.iter().map(|c| c.to_lowercase()).collect());
        mock
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Set the details to return on the next `create_payment` call.
    pub fn set_next_details(&self, details: ProviderPaymentDetails) {
        self.state().next_details = Some(details);
    }

    /// Add a payment to the "database".
    pub fn add_payment(&self, details: ProviderPaymentDetails) {
        let id = details.provider_payment_id.clone();
        self.state().payments.insert(id, details);
    }

    /// Move a stored payment to `status`. Returns false if it does not exist.
    pub fn set_status(&self, payment_id: &str, status: UnifiedPaymentStatus) -> bool {
        match self.state().payments.get_mut(payment_id) {
            Some(details) => {
                details.normalized_status = status;
                details.provider_status = status.as_str().to_string();
                true
            }
            None => false,
        }
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.state().method_errors.insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.state();
        state.next_error = None;
        state.method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    /// Get all recorded method calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    /// Check if a method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    /// Get count of calls to a method.
    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state().call_log.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.state().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), PaymentError> {
        let mut state = self.state();

        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }

    fn default_details(&self, request: ProviderPaymentCreateRequest) -> ProviderPaymentDetails {
        let short_id = uuid::Uuid::new_v4().simple().to_string();
        let price_currency = request.price_currency.to_lowercase();
        let pay_currency = request.pay_currency.to_lowercase();

        let (provider_payment_id, client_secret, pay_address) = match self.kind {
            ProviderKind::Stripe => {
                let id = format!("pi_mock_{}", &short_id[..12]);
                let secret = format!("{}_secret_{}", id, &short_id[12..24]);
                (id, Some(secret), None)
            }
            ProviderKind::NowPayments => (
                short_id[..10].to_string(),
                None,
                Some(format!("mock-{}-address", pay_currency)),
            ),
        };

        ProviderPaymentDetails {
            provider: self.kind,
            provider_payment_id,
            provider_status: UnifiedPaymentStatus::Pending.as_str().to_string(),
            normalized_status: UnifiedPaymentStatus::Pending,
            amount: request.amount,
            amount_usd: usd_amount(request.amount, &price_currency),
            price_currency,
            pay_currency,
            pay_amount: None,
            pay_address,
            expires_at: None,
            client_secret,
            metadata: request.metadata,
            raw: Value::Null,
        }
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn create_payment(
        &self,
        request: ProviderPaymentCreateRequest,
    ) -> Result<ProviderPaymentDetails, PaymentError> {
        self.record_call(
            "create_payment",
            vec![
                request.user_id.to_string(),
                request.amount.to_string(),
                request.price_currency.clone(),
                request.pay_currency.clone(),
            ],
        );
        self.check_error("create_payment")?;
        request.validate()?;

        let next = self.state().next_details.take();
        let details = match next {
            Some(details) => details,
            None => self.default_details(request),
        };

        self.state()
            .payments
            .insert(details.provider_payment_id.clone(), details.clone());

        Ok(details)
    }

    async fn get_payment_status(
        &self,
        provider_payment_id: &str,
    ) -> Result<ProviderPaymentDetails, PaymentError> {
        self.record_call("get_payment_status", vec![provider_payment_id.to_string()]);
        self.check_error("get_payment_status")?;

        self.state()
            .payments
            .get(provider_payment_id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("payment"))
    }

    async fn supports_currency(&self, currency: &str) -> Result<bool, PaymentError> {
        self.record_call("supports_currency", vec![currency.to_string()]);
        self.check_error("supports_currency")?;

        Ok(match &self.state().currencies {
            Some(currencies) => currencies.contains(&currency.to_lowercase()),
            None => true,
        })
    }
}
