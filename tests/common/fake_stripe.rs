//! Minimal in-memory Stripe API.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

/// A request as the fake received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub operation: &'static str,
    pub headers: HeaderMap,
    pub form: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Default)]
struct FakeState {
    requests: Vec<RecordedRequest>,
    intents: HashMap<String, Value>,
    next_id: u32,
    fail_with: Option<(StatusCode, Value)>,
}

#[derive(Clone, Default)]
pub struct FakeStripe {
    state: Arc<Mutex<FakeState>>,
}

impl FakeStripe {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/v1/payment_intents", post(create_intent))
            .route("/v1/payment_intents/:id", get(get_intent))
            .route("/v1/payment_intents/:id/cancel", post(cancel_intent))
            .route("/v1/customers", post(create_customer))
            .route("/v1/setup_intents", post(create_setup_intent))
            .route("/v1/payment_methods/:id/attach", post(attach_payment_method))
            .with_state(self.clone())
    }

    /// Every later request fails with `status` and a Stripe error body.
    pub fn fail_with(&self, status: u16, error: Value) {
        let status = StatusCode::from_u16(status).unwrap();
        self.state().fail_with = Some((status, json!({ "error": error })));
    }

    pub fn set_intent_status(&self, id: &str, status: &str) {
        let mut state = self.state();
        let intent = state.intents.get_mut(id).expect("known intent");
        intent["status"] = json!(status);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("at least one request")
    }

    fn record(
        &self,
        operation: &'static str,
        headers: HeaderMap,
        form: Vec<(String, String)>,
    ) -> Result<(), (StatusCode, Json<Value>)> {
        let mut state = self.state();
        state.requests.push(RecordedRequest {
            operation,
            headers,
            form,
        });
        match &state.fail_with {
            Some((status, body)) => Err((*status, Json(body.clone()))),
            None => Ok(()),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.state();
        state.next_id += 1;
        format!("{}_fake{}", prefix, state.next_id)
    }
}

fn value_of<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
    form.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn metadata_of(form: &[(String, String)]) -> Value {
    let metadata: Map<String, Value> = form
        .iter()
        .filter_map(|(k, v)| {
            k.strip_prefix("metadata[")
                .and_then(|rest| rest.strip_suffix(']'))
                .map(|key| (key.to_string(), json!(v)))
        })
        .collect();
    Value::Object(metadata)
}

fn missing(resource: &str, id: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "type": "invalid_request_error",
                "code": "resource_missing",
                "message": format!("No such {}: '{}'", resource, id)
            }
        })),
    )
}

async fn create_intent(
    State(fake): State<FakeStripe>,
    headers: HeaderMap,
    Form(form): Form<Vec<(String, String)>>,
) -> ApiResult {
    fake.record("create_payment_intent", headers, form.clone())?;

    let id = fake.next_id("pi");
    let amount: i64 = value_of(&form, "amount")
        .and_then(|a| a.parse().ok())
        .unwrap_or_default();
    let confirmed = value_of(&form, "confirm") == Some("true");
    let intent = json!({
        "id": id,
        "object": "payment_intent",
        "amount": amount,
        "currency": value_of(&form, "currency"),
        "status": if confirmed { "succeeded" } else { "requires_payment_method" },
        "client_secret": format!("{}_secret_fake", id),
        "customer": value_of(&form, "customer"),
        "payment_method": value_of(&form, "payment_method"),
        "description": value_of(&form, "description"),
        "created": 1718000000,
        "metadata": metadata_of(&form),
        "livemode": false
    });

    fake.state().intents.insert(id, intent.clone());
    Ok(Json(intent))
}

async fn get_intent(
    State(fake): State<FakeStripe>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    fake.record("retrieve_payment_intent", headers, Vec::new())?;
    let intent = fake.state().intents.get(&id).cloned();
    intent.map(Json).ok_or_else(|| missing("payment_intent", &id))
}

async fn cancel_intent(
    State(fake): State<FakeStripe>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    fake.record("cancel_payment_intent", headers, Vec::new())?;
    let mut state = fake.state();
    let intent = state
        .intents
        .get_mut(&id)
        .ok_or_else(|| missing("payment_intent", &id))?;
    intent["status"] = json!("canceled");
    Ok(Json(intent.clone()))
}

async fn create_customer(
    State(fake): State<FakeStripe>,
    headers: HeaderMap,
    Form(form): Form<Vec<(String, String)>>,
) -> ApiResult {
    fake.record("create_customer", headers, form.clone())?;
    Ok(Json(json!({
        "id": fake.next_id("cus"),
        "object": "customer",
        "email": value_of(&form, "email"),
        "name": value_of(&form, "name"),
        "created": 1718000000,
        "metadata": metadata_of(&form)
    })))
}

async fn create_setup_intent(
    State(fake): State<FakeStripe>,
    headers: HeaderMap,
    Form(form): Form<Vec<(String, String)>>,
) -> ApiResult {
    fake.record("create_setup_intent", headers, form.clone())?;
    let id = fake.next_id("seti");
    Ok(Json(json!({
        "id": id,
        "object": "setup_intent",
        "status": "requires_payment_method",
        "client_secret": format!("{}_secret_fake", id),
        "customer": value_of(&form, "customer"),
        "payment_method": null,
        "usage": value_of(&form, "usage"),
        "metadata": metadata_of(&form)
    })))
}

async fn attach_payment_method(
    State(fake): State<FakeStripe>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<Vec<(String, String)>>,
) -> ApiResult {
    fake.record("attach_payment_method", headers, form.clone())?;
    Ok(Json(json!({
        "id": id,
        "object": "payment_method",
        "type": "card",
        "customer": value_of(&form, "customer"),
        "card": {"brand": "visa", "last4": "4242", "exp_month": 12, "exp_year": 2030}
    })))
}
