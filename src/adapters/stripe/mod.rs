//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port for card payments, including:
//! - PaymentIntent creation and retrieval
//! - Customers, SetupIntents and PaymentMethods for saved cards
//! - Off-session (merchant-initiated) charges and cancellation
//!
//! # Configuration
//!
//! Required environment variables:
//! - `STRIPE_SECRET_KEY`: Stripe secret API key

mod saved_cards;
mod status;
mod stripe_adapter;
mod stripe_types;

pub use saved_cards::{
    CardSummary, CreateCustomerRequest, CreateSetupIntentRequest, Customer,
    OffSessionPaymentRequest, SavedPaymentMethod, SetupIntent,
};
pub use status::{is_supported_currency, map_stripe_status, SUPPORTED_CURRENCIES};
pub use stripe_adapter::{
    details_from_intent, off_session_idempotency_key, payment_intent_form,
    payment_idempotency_key, stripe_metadata, StripeConfig, StripeProvider, DEFAULT_STRIPE_API_BASE_URL, STRIPE_API_VERSION,
};
pub use stripe_types::{
    StripeApiError, StripeCard, StripeCustomer, StripeErrorBody, StripePaymentIntent,
    StripePaymentMethod, StripeSetupIntent,
};
