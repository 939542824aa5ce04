//! Minimal in-memory NOWPayments API.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

pub const API_KEY: &str = "NP-TEST-KEY";
pub const CREATED_AT: &str = "2024-06-01T12:00:00.000Z";

#[derive(Default)]
struct FakeState {
    create_bodies: Vec<Value>,
    payments: HashMap<String, Value>,
    next_id: u64,
    currency_fetches: u32,
    status_requests: u32,
    currency_delay: Option<Duration>,
}

#[derive(Clone)]
pub struct FakeNowPayments {
    state: Arc<Mutex<FakeState>>,
    currencies: Arc<Vec<&'static str>>,
}

impl FakeNowPayments {
    pub fn new(currencies: &[&'static str]) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                next_id: 5_077_125_050,
                ..Default::default()
            })),
            currencies: Arc::new(currencies.to_vec()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/v1/payment", post(create_payment))
            .route("/v1/payment/:id", get(get_payment))
            .route("/v1/currencies", get(currencies))
            .with_state(self.clone())
    }

    pub fn create_bodies(&self) -> Vec<Value> {
        self.state().create_bodies.clone()
    }

    pub fn currency_fetches(&self) -> u32 {
        self.state().currency_fetches
    }

    pub fn status_requests(&self) -> u32 {
        self.state().status_requests
    }

    /// Makes `/currencies` stall for `delay` before answering.
    pub fn delay_currencies(&self, delay: Option<Duration>) {
        self.state().currency_delay = delay;
    }

    pub fn set_status(&self, payment_id: &str, status: &str) {
        let mut state = self.state();
        let payment = state.payments.get_mut(payment_id).expect("known payment");
        payment["payment_status"] = json!(status);
    }
}

fn authorize(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        Some(API_KEY) => Ok(()),
        _ => Err((
            StatusCode::FORBIDDEN,
            Json(json!({
                "status": false,
                "statusCode": 403,
                "code": "INVALID_API_KEY",
                "message": "Invalid api key"
            })),
        )),
    }
}

async fn create_payment(
    State(fake): State<FakeNowPayments>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult {
    authorize(&headers)?;

    let mut state = fake.state();
    state.create_bodies.push(body.clone());
    state.next_id += 1;
    let payment_id = state.next_id.to_string();

    let payment = json!({
        "payment_id": payment_id,
        "payment_status": "waiting",
        "pay_address": "bc1qfakeaddressxyz",
        "price_amount": body["price_amount"],
        "price_currency": body["price_currency"],
        "pay_amount": 0.00041,
        "pay_currency": body["pay_currency"],
        "order_id": body["order_id"],
        "order_description": body["order_description"],
        "ipn_callback_url": body["ipn_callback_url"],
        "purchase_id": "4944856743",
        "created_at": CREATED_AT,
        "updated_at": CREATED_AT
    });
    state.payments.insert(payment_id, payment.clone());
    Ok(Json(payment))
}

async fn get_payment(
    State(fake): State<FakeNowPayments>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    authorize(&headers)?;

    let mut state = fake.state();
    state.status_requests += 1;
    let mut payment = state.payments.get(&id).cloned().ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({
                "status": false,
                "statusCode": 404,
                "code": "PAYMENT_NOT_FOUND",
                "message": "Payment not found"
            })),
        )
    })?;

    // Lookups report the id as a number and amounts as strings.
    payment["payment_id"] = json!(id.parse::<u64>().unwrap());
    payment["pay_amount"] = json!(payment["pay_amount"].to_string());
    payment["actually_paid"] = json!(0);
    Ok(Json(payment))
}

async fn currencies(State(fake): State<FakeNowPayments>, headers: HeaderMap) -> ApiResult {
    authorize(&headers)?;
    let delay = fake.state().currency_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    fake.state().currency_fetches += 1;
    Ok(Json(json!({ "currencies": fake.currencies.as_slice() })))
}
