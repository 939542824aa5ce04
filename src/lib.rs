//! Payments Core - unified card and crypto payment providers
//!
//! This crate puts Stripe (cards) and NOWPayments (crypto) behind a single
//! `PaymentProvider` contract and normalizes their native statuses into one
//! `UnifiedPaymentStatus` vocabulary.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
