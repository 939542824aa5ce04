//! NOWPayments status normalization.

use crate::domain::payment::UnifiedPaymentStatus;

/// Maps a NOWPayments `payment_status` to the unified vocabulary.
///
/// Every intermediate confirmation state collapses to `Processing`, and so
/// does any value we do not recognize.
pub fn map_nowpayments_status(status: &str) -> UnifiedPaymentStatus {
    match status {
        "finished" => UnifiedPaymentStatus::Succeeded,
        "failed" | "refunded" => UnifiedPaymentStatus::Failed,
        "expired" => UnifiedPaymentStatus::Expired,
        "pending" | "waiting" | "confirming" | "confirmed" | "sending" | "partially_paid" => {
            UnifiedPaymentStatus::Processing
        }
        other => {
            tracing::warn!(status = other, "Unrecognized NOWPayments status, treating as processing");
            UnifiedPaymentStatus::Processing
        }
    }
}
