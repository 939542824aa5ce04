//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the payment domain and the outside world. Adapters implement these ports.
//!
//! - `PaymentProvider` - The provider-agnostic payment contract
//! - `NowPaymentsClient` - Transport used by the crypto adapter

mod nowpayments_client;
mod payment_provider;

pub use nowpayments_client::{NowPaymentsClient, NowPaymentsCreatePayment, NowPaymentsPayment};
pub use payment_provider::{classify_http_failure, PaymentError, PaymentErrorCode, PaymentProvider};
