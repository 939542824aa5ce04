//! Stripe status normalization.

use crate::domain::payment::UnifiedPaymentStatus;

/// Card currencies accepted for Stripe payments.
pub const SUPPORTED_CURRENCIES: [&str; 4] = ["usd", "gbp", "cad", "eur"];

/// Maps a PaymentIntent (or SetupIntent) status to the unified vocabulary.
///
/// Total: unrecognized values map to `Pending`.
pub fn map_stripe_status(status: &str) -> UnifiedPaymentStatus {
    match status {
        "succeeded" => UnifiedPaymentStatus::Succeeded,
        "processing" => UnifiedPaymentStatus::Processing,
        "requires_payment_method" => UnifiedPaymentStatus::RequiresPaymentMethod,
        "requires_action" | "requires_confirmation" | "requires_capture" => {
            UnifiedPaymentStatus::RequiresAction
        }
        "canceled" => UnifiedPaymentStatus::Canceled,
        other => {
            tracing::warn!(status = other, "Unrecognized Stripe status, treating as pending");
            UnifiedPaymentStatus::Pending
        }
    }
}

/// Case-insensitive check against the static allow-list.
pub fn is_supported_currency(currency: &str) -> bool {
    SUPPORTED_CURRENCIES
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(currency))
}
