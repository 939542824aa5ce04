//! Foundation module - Shared domain primitives.
//!
//! Value objects and error types used across the payment domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::ValidationError;
pub use ids::UserId;
pub use timestamp::Timestamp;
