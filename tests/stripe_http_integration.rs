//! Integration tests for the Stripe adapter.
//!
//! These tests drive `StripeProvider` over real HTTP against an in-process
//! fake of the Stripe API and verify:
//! 1. Request encoding (minor units, metadata, headers)
//! 2. Response normalization
//! 3. Error classification
//! 4. Saved-card operations

mod common;

use serde_json::json;

use common::fake_stripe::FakeStripe;
use payments_core::adapters::stripe::{
    CreateCustomerRequest, CreateSetupIntentRequest, OffSessionPaymentRequest, StripeConfig,
    StripeProvider,
};
use payments_core::domain::foundation::UserId;
use payments_core::domain::payment::{
    Metadata, ProviderKind, ProviderPaymentCreateRequest, UnifiedPaymentStatus,
};
use payments_core::ports::{PaymentErrorCode, PaymentProvider};

// =============================================================================
// Test Infrastructure
// =============================================================================

const SECRET_KEY: &str = "sk_test_integration";

async fn setup() -> (FakeStripe, StripeProvider) {
    let fake = FakeStripe::new();
    let base_url = common::spawn(fake.router()).await;
    let provider = StripeProvider::new(StripeConfig::new(SECRET_KEY).with_base_url(base_url));
    (fake, provider)
}

fn user() -> UserId {
    UserId::new("user-42").unwrap()
}

fn subscription_request() -> ProviderPaymentCreateRequest {
    ProviderPaymentCreateRequest::new(user(), 49.99, "usd")
        .with_order_id("order-123")
        .with_description("Pro plan")
        .with_metadata("auto_renew", true)
        .with_metadata("plan", "pro")
}

// =============================================================================
// Payment Intents
// =============================================================================

#[tokio::test]
async fn create_payment_encodes_intent_form() {
    let (fake, provider) = setup().await;

    provider.create_payment(subscription_request()).await.unwrap();

    let request = fake.last_request();
    assert_eq!(request.operation, "create_payment_intent");
    assert_eq!(request.form_value("amount"), Some("4999"));
    assert_eq!(request.form_value("currency"), Some("usd"));
    assert_eq!(request.form_value("payment_method_types[]"), Some("card"));
    assert_eq!(request.form_value("setup_future_usage"), Some("off_session"));
    assert_eq!(request.form_value("description"), Some("Pro plan"));
    assert_eq!(request.form_value("metadata[user_id]"), Some("user-42"));
    assert_eq!(request.form_value("metadata[order_id]"), Some("order-123"));
    assert_eq!(request.form_value("metadata[auto_renew]"), Some("true"));
    assert_eq!(request.form_value("metadata[plan]"), Some("pro"));
}

#[tokio::test]
async fn create_payment_sends_auth_version_and_idempotency_headers() {
    let (fake, provider) = setup().await;

    provider.create_payment(subscription_request()).await.unwrap();

    let request = fake.last_request();
    assert!(request.header("authorization").unwrap().starts_with("Basic "));
    assert_eq!(request.header("stripe-version"), Some("2024-06-20"));
    assert_eq!(request.header("idempotency-key"), Some("payment-order-123"));
}

#[tokio::test]
async fn create_payment_without_order_id_has_no_idempotency_key() {
    let (fake, provider) = setup().await;

    let request = ProviderPaymentCreateRequest::new(user(), 10.0, "eur");
    provider.create_payment(request).await.unwrap();

    let recorded = fake.last_request();
    assert_eq!(recorded.header("idempotency-key"), None);
    assert_eq!(recorded.form_value("setup_future_usage"), None);
}

#[tokio::test]
async fn create_payment_normalizes_response() {
    let (_fake, provider) = setup().await;

    let details = provider.create_payment(subscription_request()).await.unwrap();

    assert_eq!(details.provider, ProviderKind::Stripe);
    assert!(details.provider_payment_id.starts_with("pi_"));
    assert!(!details.client_secret.as_deref().unwrap_or_default().is_empty());
    assert!(matches!(
        details.normalized_status,
        UnifiedPaymentStatus::RequiresAction
            | UnifiedPaymentStatus::RequiresPaymentMethod
            | UnifiedPaymentStatus::Pending
    ));
    assert_eq!(details.amount, 49.99);
    assert_eq!(details.amount_usd, Some(49.99));
    assert_eq!(details.price_currency, "usd");
    assert_eq!(details.pay_currency, "usd");
    assert!(details.pay_address.is_none());
    assert_eq!(details.metadata["auto_renew"], json!("true"));
    assert_eq!(details.raw["livemode"], json!(false));
}

#[tokio::test]
async fn status_round_trip_preserves_amount() {
    let (fake, provider) = setup().await;

    for amount in [0.01, 1.10, 19.99, 1234.56] {
        let created = provider
            .create_payment(ProviderPaymentCreateRequest::new(user(), amount, "gbp"))
            .await
            .unwrap();
        let fetched = provider
            .get_payment_status(&created.provider_payment_id)
            .await
            .unwrap();

        assert_eq!(fetched.amount, amount, "amount {}", amount);
        assert_eq!(fetched.amount_usd, None);
    }
    assert_eq!(fake.requests().len(), 8);
}

#[tokio::test]
async fn status_reflects_provider_progress() {
    let (fake, provider) = setup().await;

    let created = provider.create_payment(subscription_request()).await.unwrap();
    fake.set_intent_status(&created.provider_payment_id, "succeeded");

    let details = provider
        .get_payment_status(&created.provider_payment_id)
        .await
        .unwrap();
    assert_eq!(details.provider_status, "succeeded");
    assert_eq!(details.normalized_status, UnifiedPaymentStatus::Succeeded);
    assert_eq!(fake.last_request().header("idempotency-key"), None);
}

#[tokio::test]
async fn unsupported_currency_is_rejected_before_any_request() {
    let (fake, provider) = setup().await;

    let err = provider
        .create_payment(ProviderPaymentCreateRequest::new(user(), 500.0, "jpy"))
        .await
        .unwrap_err();

    assert_eq!(err.code, PaymentErrorCode::UnsupportedCurrency);
    assert!(fake.requests().is_empty());
    assert!(!provider.supports_currency("jpy").await.unwrap());
    assert!(provider.supports_currency("CAD").await.unwrap());
}

// =============================================================================
// Error Classification
// =============================================================================

#[tokio::test]
async fn unknown_intent_is_not_found() {
    let (_fake, provider) = setup().await;

    let err = provider.get_payment_status("pi_missing").await.unwrap_err();
    assert_eq!(err.code, PaymentErrorCode::NotFound);
    assert_eq!(err.provider_code.as_deref(), Some("resource_missing"));
    assert!(!err.retryable);
}

#[tokio::test]
async fn card_decline_is_classified() {
    let (fake, provider) = setup().await;
    fake.fail_with(
        402,
        json!({
            "type": "card_error",
            "code": "card_declined",
            "decline_code": "generic_decline",
            "message": "Your card was declined."
        }),
    );

    let err = provider.create_payment(subscription_request()).await.unwrap_err();
    assert_eq!(err.code, PaymentErrorCode::CardDeclined);
    assert_eq!(err.message, "Your card was declined.");
}

#[tokio::test]
async fn insufficient_funds_is_classified() {
    let (fake, provider) = setup().await;
    fake.fail_with(
        402,
        json!({
            "type": "card_error",
            "code": "card_declined",
            "decline_code": "insufficient_funds",
            "message": "Your card has insufficient funds."
        }),
    );

    let err = provider.create_payment(subscription_request()).await.unwrap_err();
    assert_eq!(err.code, PaymentErrorCode::InsufficientFunds);
    assert_eq!(err.provider_code.as_deref(), Some("insufficient_funds"));
}

#[tokio::test]
async fn bad_key_is_authentication_error() {
    let (fake, provider) = setup().await;
    fake.fail_with(
        401,
        json!({"type": "invalid_request_error", "message": "Invalid API Key provided"}),
    );

    let err = provider.get_payment_status("pi_any").await.unwrap_err();
    assert_eq!(err.code, PaymentErrorCode::AuthenticationError);
}

#[tokio::test]
async fn rate_limit_is_retryable() {
    let (fake, provider) = setup().await;
    fake.fail_with(
        429,
        json!({"type": "invalid_request_error", "code": "rate_limit", "message": "Too many requests"}),
    );

    let err = provider.create_payment(subscription_request()).await.unwrap_err();
    assert_eq!(err.code, PaymentErrorCode::RateLimitExceeded);
    assert!(err.retryable);
}

#[tokio::test]
async fn unreachable_api_is_network_error() {
    let provider = StripeProvider::new(
        StripeConfig::new(SECRET_KEY).with_base_url(common::unreachable_base_url()),
    );

    let err = provider.create_payment(subscription_request()).await.unwrap_err();
    assert_eq!(err.code, PaymentErrorCode::NetworkError);
    assert!(err.retryable);
}

#[tokio::test]
async fn path_injection_is_rejected_locally() {
    let (fake, provider) = setup().await;

    let err = provider.get_payment_status("pi_1/../../v1/customers").await.unwrap_err();
    assert_eq!(err.code, PaymentErrorCode::InvalidRequest);
    assert!(fake.requests().is_empty());
}

// =============================================================================
// Saved Cards
// =============================================================================

#[tokio::test]
async fn saved_card_flow() {
    let (fake, provider) = setup().await;

    let customer = provider
        .create_customer(CreateCustomerRequest {
            user_id: user(),
            email: "ada@example.com".to_string(),
            name: Some("Ada".to_string()),
            idempotency_key: Some("customer-user-42".to_string()),
        })
        .await
        .unwrap();
    assert!(customer.id.starts_with("cus_"));
    assert_eq!(customer.email.as_deref(), Some("ada@example.com"));
    assert_eq!(fake.last_request().header("idempotency-key"), Some("customer-user-42"));

    let setup_intent = provider
        .create_setup_intent(CreateSetupIntentRequest {
            customer_id: customer.id.clone(),
            metadata: Metadata::new(),
        })
        .await
        .unwrap();
    assert_eq!(setup_intent.customer_id.as_deref(), Some(customer.id.as_str()));
    assert_eq!(
        setup_intent.normalized_status,
        UnifiedPaymentStatus::RequiresPaymentMethod
    );
    assert_eq!(fake.last_request().form_value("usage"), Some("off_session"));

    let method = provider
        .attach_payment_method("pm_card_visa", &customer.id)
        .await
        .unwrap();
    assert_eq!(method.customer_id.as_deref(), Some(customer.id.as_str()));
    assert_eq!(method.card.unwrap().last4, "4242");

    let charge = provider
        .create_off_session_payment(OffSessionPaymentRequest {
            user_id: user(),
            customer_id: customer.id.clone(),
            payment_method_id: method.id,
            amount: 9.99,
            currency: "USD".to_string(),
            description: Some("Renewal".to_string()),
            order_id: Some("renewal-7".to_string()),
            idempotency_key: None,
            metadata: Metadata::new(),
        })
        .await
        .unwrap();
    let recorded = fake.last_request();
    assert_eq!(recorded.form_value("amount"), Some("999"));
    assert_eq!(recorded.form_value("currency"), Some("usd"));
    assert_eq!(recorded.form_value("off_session"), Some("true"));
    assert_eq!(recorded.form_value("confirm"), Some("true"));
    assert_eq!(recorded.header("idempotency-key"), Some("off-session-renewal-7"));
    assert_eq!(charge.normalized_status, UnifiedPaymentStatus::Succeeded);
}

fn renewal_charge(order_id: &str, idempotency_key: Option<&str>) -> OffSessionPaymentRequest {
    OffSessionPaymentRequest {
        user_id: user(),
        customer_id: "cus_renewal".to_string(),
        payment_method_id: "pm_card_visa".to_string(),
        amount: 49.99,
        currency: "usd".to_string(),
        description: None,
        order_id: Some(order_id.to_string()),
        idempotency_key: idempotency_key.map(str::to_string),
        metadata: Metadata::new(),
    }
}

#[tokio::test]
async fn on_and_off_session_intents_use_distinct_idempotency_keys() {
    let (fake, provider) = setup().await;

    provider.create_payment(subscription_request()).await.unwrap();
    provider
        .create_off_session_payment(renewal_charge("order-123", None))
        .await
        .unwrap();

    let requests = fake.requests();
    let on_session = requests[0].header("idempotency-key");
    let off_session = requests[1].header("idempotency-key");
    assert_eq!(on_session, Some("payment-order-123"));
    assert_eq!(off_session, Some("off-session-order-123"));
    assert_ne!(on_session, off_session);
}

#[tokio::test]
async fn off_session_payment_prefers_explicit_idempotency_key() {
    let (fake, provider) = setup().await;

    provider
        .create_off_session_payment(renewal_charge("order-123", Some("renewal-2024-07")))
        .await
        .unwrap();

    assert_eq!(
        fake.last_request().header("idempotency-key"),
        Some("renewal-2024-07")
    );
}

#[tokio::test]
async fn sub_cent_amounts_are_rejected_before_any_request() {
    let (fake, provider) = setup().await;

    let err = provider
        .create_payment(ProviderPaymentCreateRequest::new(user(), 0.004, "usd"))
        .await
        .unwrap_err();
    assert_eq!(err.code, PaymentErrorCode::InvalidRequest);

    let mut charge = renewal_charge("order-123", None);
    charge.amount = 0.004;
    let err = provider.create_off_session_payment(charge).await.unwrap_err();
    assert_eq!(err.code, PaymentErrorCode::InvalidRequest);

    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn cancel_payment_intent_marks_canceled() {
    let (_fake, provider) = setup().await;

    let created = provider.create_payment(subscription_request()).await.unwrap();
    let canceled = provider
        .cancel_payment_intent(&created.provider_payment_id)
        .await
        .unwrap();

    assert_eq!(canceled.provider_status, "canceled");
    assert_eq!(canceled.normalized_status, UnifiedPaymentStatus::Canceled);
    assert!(canceled.normalized_status.is_terminal());
}
