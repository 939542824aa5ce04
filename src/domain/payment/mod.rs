//! Payment domain - the provider-agnostic payment vocabulary.
//!
//! Requests, normalized details and the unified status shared by every
//! provider adapter.

mod details;
mod kind;
pub mod metadata;
pub mod money;
mod request;
mod status;

pub use details::{usd_amount, ProviderPaymentDetails};
pub use kind::ProviderKind;
pub use metadata::Metadata;
pub use request::ProviderPaymentCreateRequest;
pub use status::UnifiedPaymentStatus;
