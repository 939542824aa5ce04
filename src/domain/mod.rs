//! Domain layer containing payment types and normalization rules.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, validation errors)
//! - `payment` - Provider-agnostic payment requests, details and statuses

pub mod foundation;
pub mod payment;
