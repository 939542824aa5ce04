//! Saved-card operations for auto-renewal.
//!
//! These sit outside the `PaymentProvider` contract: the renewal workflow
//! creates a customer, saves a card through a SetupIntent (or a PaymentIntent
//! with `setup_future_usage`), then charges it later without the customer
//! present.

use serde::{Deserialize, Serialize};

use crate::adapters::http_json;
use crate::domain::foundation::UserId;
use crate::domain::payment::metadata::coerce_metadata;
use crate::domain::payment::money::to_minor_units;
use crate::domain::payment::{Metadata, ProviderKind, ProviderPaymentDetails, UnifiedPaymentStatus};
use crate::ports::PaymentError;

use super::status::{is_supported_currency, map_stripe_status};
use super::stripe_adapter::{
    ensure_chargeable, off_session_idempotency_key, push_metadata, stripe_metadata, StripeProvider,
};
use super::stripe_types::{StripeCard, StripeCustomer, StripePaymentMethod, StripeSetupIntent};

/// Request to create a Stripe customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    /// Internal user ID (stored as metadata).
    pub user_id: UserId,

    /// Customer email address.
    pub email: String,

    /// Customer name (optional).
    pub name: Option<String>,

    /// Idempotency key for safe retries.
    pub idempotency_key: Option<String>,
}

/// Customer in the payment system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Provider's customer ID.
    pub id: String,

    pub email: Option<String>,

    pub name: Option<String>,

    /// When the customer was created (provider timestamp).
    pub created_at: i64,
}

/// Request to start saving a card for later off-session use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSetupIntentRequest {
    pub customer_id: String,

    #[serde(default)]
    pub metadata: Metadata,
}

/// SetupIntent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupIntent {
    pub id: String,

    /// Native SetupIntent status.
    pub status: String,

    /// SetupIntent statuses share the PaymentIntent vocabulary.
    pub normalized_status: UnifiedPaymentStatus,

    pub client_secret: Option<String>,

    pub customer_id: Option<String>,

    /// Saved payment method, once the customer has completed setup.
    pub payment_method_id: Option<String>,
}

/// Saved payment method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPaymentMethod {
    pub id: String,

    /// Payment method type (card, ...).
    pub method_type: String,

    pub customer_id: Option<String>,

    pub card: Option<CardSummary>,
}

/// Display-safe card details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSummary {
    pub brand: String,
    pub last4: String,
    pub exp_month: u32,
    pub exp_year: u32,
}

/// Merchant-initiated charge against a saved card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffSessionPaymentRequest {
    pub user_id: UserId,

    pub customer_id: String,

    pub payment_method_id: String,

    /// Amount in major units.
    pub amount: f64,

    pub currency: String,

    pub description: Option<String>,

    /// Correlation key; the fallback idempotency key is derived from it.
    pub order_id: Option<String>,

    /// Explicit idempotency key, e.g. one per renewal period.
    #[serde(default)]
    pub idempotency_key: Option<String>,

    #[serde(default)]
    pub metadata: Metadata,
}

impl From<StripeCustomer> for Customer {
    fn from(customer: StripeCustomer) -> Self {
        Self {
            id: customer.id,
            email: customer.email,
            name: customer.name,
            created_at: customer.created,
        }
    }
}

impl From<StripeSetupIntent> for SetupIntent {
    fn from(intent: StripeSetupIntent) -> Self {
        Self {
            normalized_status: map_stripe_status(&intent.status),
            id: intent.id,
            status: intent.status,
            client_secret: intent.client_secret,
            customer_id: intent.customer,
            payment_method_id: intent.payment_method,
        }
    }
}

impl From<StripeCard> for CardSummary {
    fn from(card: StripeCard) -> Self {
        Self {
            brand: card.brand,
            last4: card.last4,
            exp_month: card.exp_month,
            exp_year: card.exp_year,
        }
    }
}

impl From<StripePaymentMethod> for SavedPaymentMethod {
    fn from(method: StripePaymentMethod) -> Self {
        Self {
            id: method.id,
            method_type: method.method_type,
            customer_id: method.customer,
            card: method.card.map(CardSummary::from),
        }
    }
}

/// Form body for `POST /v1/customers`.
pub fn customer_form(request: &CreateCustomerRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("email".to_string(), request.email.clone()),
        ("metadata[user_id]".to_string(), request.user_id.to_string()),
    ];
    if let Some(name) = &request.name {
        form.push(("name".to_string(), name.clone()));
    }
    form
}

/// Form body for `POST /v1/setup_intents`.
pub fn setup_intent_form(request: &CreateSetupIntentRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("customer".to_string(), request.customer_id.clone()),
        ("usage".to_string(), "off_session".to_string()),
        ("payment_method_types[]".to_string(), "card".to_string()),
    ];
    push_metadata(&mut form, coerce_metadata(&request.metadata));
    form
}

/// Form body for an off-session, immediately confirmed PaymentIntent.
pub fn off_session_form(request: &OffSessionPaymentRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("amount".to_string(), to_minor_units(request.amount).to_string()),
        ("currency".to_string(), request.currency.to_lowercase()),
        ("customer".to_string(), request.customer_id.clone()),
        ("payment_method".to_string(), request.payment_method_id.clone()),
        ("payment_method_types[]".to_string(), "card".to_string()),
        ("off_session".to_string(), "true".to_string()),
        ("confirm".to_string(), "true".to_string()),
    ];
    if let Some(description) = &request.description {
        form.push(("description".to_string(), description.clone()));
    }
    push_metadata(
        &mut form,
        stripe_metadata(&request.user_id, request.order_id.as_deref(), &request.metadata),
    );
    form
}

impl StripeProvider {
    /// Create a customer to attach saved cards to.
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<Customer, PaymentError> {
        let form = customer_form(&request);
        let raw = self
            .execute(
                "create_customer",
                self.post_form("/v1/customers", &form, request.idempotency_key.as_deref()),
            )
            .await?;
        let customer: StripeCustomer = http_json::decode(ProviderKind::Stripe, &raw)?;

        tracing::info!(customer = %customer.id, user_id = %request.user_id, "Stripe customer created");

        Ok(customer.into())
    }

    /// Start saving a card for off-session use.
    pub async fn create_setup_intent(
        &self,
        request: CreateSetupIntentRequest,
    ) -> Result<SetupIntent, PaymentError> {
        http_json::path_id("customer", &request.customer_id)?;
        let form = setup_intent_form(&request);
        let raw = self
            .execute(
                "create_setup_intent",
                self.post_form("/v1/setup_intents", &form, None),
            )
            .await?;
        let intent: StripeSetupIntent = http_json::decode(ProviderKind::Stripe, &raw)?;

        tracing::info!(
            setup_intent = %intent.id,
            customer = %request.customer_id,
            "Stripe setup intent created"
        );

        Ok(intent.into())
    }

    pub async fn retrieve_setup_intent(
        &self,
        setup_intent_id: &str,
    ) -> Result<SetupIntent, PaymentError> {
        let id = http_json::path_id("setup_intent", setup_intent_id)?;
        let raw = self
            .execute(
                "retrieve_setup_intent",
                self.get(&format!("/v1/setup_intents/{}", id)),
            )
            .await?;
        let intent: StripeSetupIntent = http_json::decode(ProviderKind::Stripe, &raw)?;
        Ok(intent.into())
    }

    pub async fn retrieve_payment_method(
        &self,
        payment_method_id: &str,
    ) -> Result<SavedPaymentMethod, PaymentError> {
        let id = http_json::path_id("payment_method", payment_method_id)?;
        let raw = self
            .execute(
                "retrieve_payment_method",
                self.get(&format!("/v1/payment_methods/{}", id)),
            )
            .await?;
        let method: StripePaymentMethod = http_json::decode(ProviderKind::Stripe, &raw)?;
        Ok(method.into())
    }

    /// Attach a payment method to a customer so it can be charged later.
    pub async fn attach_payment_method(
        &self,
        payment_method_id: &str,
        customer_id: &str,
    ) -> Result<SavedPaymentMethod, PaymentError> {
        let id = http_json::path_id("payment_method", payment_method_id)?;
        let form = vec![("customer".to_string(), customer_id.to_string())];
        let raw = self
            .execute(
                "attach_payment_method",
                self.post_form(&format!("/v1/payment_methods/{}/attach", id), &form, None),
            )
            .await?;
        let method: StripePaymentMethod = http_json::decode(ProviderKind::Stripe, &raw)?;

        tracing::info!(payment_method = %method.id, customer = customer_id, "Payment method attached");

        Ok(method.into())
    }

    /// Charge a saved card without the customer present.
    ///
    /// The intent is confirmed immediately. A declined card surfaces as a
    /// `CardDeclined` or `InsufficientFunds` error.
    pub async fn create_off_session_payment(
        &self,
        request: OffSessionPaymentRequest,
    ) -> Result<ProviderPaymentDetails, PaymentError> {
        if !request.amount.is_finite() || request.amount <= 0.0 {
            return Err(PaymentError::invalid_request(format!(
                "amount must be a positive finite number, got {}",
                request.amount
            )));
        }
        if !is_supported_currency(&request.currency) {
            return Err(PaymentError::unsupported_currency(
                ProviderKind::Stripe,
                &request.currency,
            ));
        }
        ensure_chargeable(request.amount)?;
        let form = off_session_form(&request);
        let idempotency_key = request
            .idempotency_key
            .clone()
            .or_else(|| request.order_id.as_deref().map(off_session_idempotency_key));
        let details = self
            .execute_intent(
                "create_off_session_payment",
                self.post_form("/v1/payment_intents", &form, idempotency_key.as_deref()),
            )
            .await?;

        tracing::info!(
            payment_intent = %details.provider_payment_id,
            customer = %request.customer_id,
            user_id = %request.user_id,
            status = %details.normalized_status,
            "Off-session payment created"
        );

        Ok(details)
    }

    /// Cancel a PaymentIntent that has not completed.
    pub async fn cancel_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<ProviderPaymentDetails, PaymentError> {
        let id = http_json::path_id("payment_intent", payment_intent_id)?;
        let details = self
            .execute_intent(
                "cancel_payment_intent",
                self.post_form(&format!("/v1/payment_intents/{}/cancel", id), &[], None),
            )
            .await?;

        tracing::info!(payment_intent = %details.provider_payment_id, "Stripe payment intent canceled");

        Ok(details)
    }
}
