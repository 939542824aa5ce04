//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `stripe` - Card payments over the Stripe REST API
//! - `nowpayments` - Crypto payments over the NOWPayments REST API
//! - `mock_payment_provider` - In-memory provider for tests

pub(crate) mod http_json;
mod mock_payment_provider;
pub mod nowpayments;
pub mod stripe;

pub use mock_payment_provider::{MethodCall, MockPaymentProvider};
pub use nowpayments::{MockNowPaymentsClient, NowPaymentsHttpClient, NowPaymentsProvider};
pub use stripe::StripeProvider;
