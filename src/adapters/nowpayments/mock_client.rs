//! In-memory NOWPayments client for tests.
//!
//! Hands out sequential payment ids, records every create request and lets a
//! test drive payment status forward or inject failures.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::ports::{NowPaymentsClient, NowPaymentsCreatePayment, NowPaymentsPayment, PaymentError};

/// Default exchange rate applied to `price_amount` to produce `pay_amount`.
const DEFAULT_PAY_RATE: f64 = 0.000_016;

#[derive(Debug)]
struct MockState {
    next_id: u64,
    payments: HashMap<String, NowPaymentsPayment>,
    create_requests: Vec<NowPaymentsCreatePayment>,
    currencies: HashSet<String>,
    pay_rate: f64,
    fail_next: Option<PaymentError>,
    currency_checks: u32,
}

/// Mock NOWPayments API.
#[derive(Debug, Clone)]
pub struct MockNowPaymentsClient {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockNowPaymentsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNowPaymentsClient {
    /// Supports `btc`, `eth`, `ltc` and `usdttrc20` out of the box.
    pub fn new() -> Self {
        Self::with_currencies(&["btc", "eth", "ltc", "usdttrc20"])
    }

    pub fn with_currencies(currencies: &[&str]) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                next_id: 5_000_000_001,
                payments: HashMap::new(),
                create_requests: Vec::new(),
                currencies: currencies.iter().map(|c| c.to_lowercase()).collect(),
                pay_rate: DEFAULT_PAY_RATE,
                fail_next: None,
                currency_checks: 0,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes the next API call fail with `error`.
    pub fn fail_next(&self, error: PaymentError) {
        self.state().fail_next = Some(error);
    }

    pub fn set_pay_rate(&self, rate: f64) {
        self.state().pay_rate = rate;
    }

    /// Moves a stored payment to `status`.
    pub fn set_status(&self, payment_id: &str, status: &str) -> bool {
        let mut state = self.state();
        match state.payments.get_mut(payment_id) {
            Some(payment) => {
                payment.payment_status = status.to_string();
                payment.updated_at = Some(Utc::now());
                payment.raw = to_raw(payment);
                true
            }
            None => false,
        }
    }

    /// Overrides a stored payment's creation time.
    pub fn set_created_at(&self, payment_id: &str, created_at: DateTime<Utc>) -> bool {
        let mut state = self.state();
        match state.payments.get_mut(payment_id) {
            Some(payment) => {
                payment.created_at = Some(created_at);
                payment.raw = to_raw(payment);
                true
            }
            None => false,
        }
    }

    /// Every `POST /payment` body received, in order.
    pub fn create_requests(&self) -> Vec<NowPaymentsCreatePayment> {
        self.state().create_requests.clone()
    }

    pub fn last_create_request(&self) -> Option<NowPaymentsCreatePayment> {
        self.state().create_requests.last().cloned()
    }

    pub fn currency_checks(&self) -> u32 {
        self.state().currency_checks
    }

    fn take_failure(state: &mut MockState) -> Result<(), PaymentError> {
        match state.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn to_raw(payment: &NowPaymentsPayment) -> serde_json::Value {
    serde_json::to_value(payment).unwrap_or_default()
}

#[async_trait]
impl NowPaymentsClient for MockNowPaymentsClient {
    async fn create_payment(
        &self,
        request: NowPaymentsCreatePayment,
    ) -> Result<NowPaymentsPayment, PaymentError> {
        let mut state = self.state();
        state.create_requests.push(request.clone());
        Self::take_failure(&mut state)?;

        let payment_id = state.next_id.to_string();
        state.next_id += 1;

        let now = Utc::now();
        let mut payment = NowPaymentsPayment {
            payment_id: payment_id.clone(),
            payment_status: "waiting".to_string(),
            pay_address: Some(format!("mock-{}-address-{}", request.pay_currency, payment_id)),
            price_amount: Some(request.price_amount),
            price_currency: Some(request.price_currency),
            pay_amount: Some(request.price_amount * state.pay_rate),
            pay_currency: Some(request.pay_currency),
            order_id: Some(request.order_id),
            order_description: request.order_description,
            created_at: Some(now),
            updated_at: Some(now),
            raw: serde_json::Value::Null,
        };
        payment.raw = to_raw(&payment);

        state.payments.insert(payment_id, payment.clone());
        Ok(payment)
    }

    async fn get_payment_status(&self, payment_id: &str) -> Result<NowPaymentsPayment, PaymentError> {
        let mut state = self.state();
        Self::take_failure(&mut state)?;
        state
            .payments
            .get(payment_id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("payment"))
    }

    async fn is_currency_supported(&self, currency: &str) -> Result<bool, PaymentError> {
        let mut state = self.state();
        state.currency_checks += 1;
        Self::take_failure(&mut state)?;
        Ok(state.currencies.contains(&currency.to_lowercase()))
    }
}
