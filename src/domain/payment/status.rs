//! Unified payment status vocabulary.
//!
//! Every provider adapter translates its native status into one of these
//! values. Business logic branches on `UnifiedPaymentStatus` only; the raw
//! provider status is kept alongside for audit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider-agnostic payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnifiedPaymentStatus {
    /// Created, nothing has happened yet.
    Pending,

    /// Funds are in flight (card processing, crypto confirmations).
    Processing,

    /// Customer must complete an extra step (3DS, confirmation).
    RequiresAction,

    /// Customer must supply a (new) payment method.
    RequiresPaymentMethod,

    /// Funds captured.
    Succeeded,

    /// Payment failed or was refunded.
    Failed,

    /// Payment was canceled before completion.
    Canceled,

    /// Payment window elapsed without funds arriving.
    Expired,
}

impl UnifiedPaymentStatus {
    /// All variants, in lifecycle order.
    pub const ALL: [UnifiedPaymentStatus; 8] = [
        UnifiedPaymentStatus::Pending,
        UnifiedPaymentStatus::Processing,
        UnifiedPaymentStatus::RequiresAction,
        UnifiedPaymentStatus::RequiresPaymentMethod,
        UnifiedPaymentStatus::Succeeded,
        UnifiedPaymentStatus::Failed,
        UnifiedPaymentStatus::Canceled,
        UnifiedPaymentStatus::Expired,
    ];

    /// Returns true once the payment can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UnifiedPaymentStatus::Succeeded
                | UnifiedPaymentStatus::Failed
                | UnifiedPaymentStatus::Canceled
                | UnifiedPaymentStatus::Expired
        )
    }

    /// Returns true if funds were captured.
    pub fn is_success(&self) -> bool {
        matches!(self, UnifiedPaymentStatus::Succeeded)
    }

    /// Returns true if progress is blocked on the customer.
    pub fn requires_customer(&self) -> bool {
        matches!(
            self,
            UnifiedPaymentStatus::RequiresAction | UnifiedPaymentStatus::RequiresPaymentMethod
        )
    }

    /// Returns true while the payment is still in flight with no customer step pending.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            UnifiedPaymentStatus::Pending | UnifiedPaymentStatus::Processing
        )
    }

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnifiedPaymentStatus::Pending => "pending",
            UnifiedPaymentStatus::Processing => "processing",
            UnifiedPaymentStatus::RequiresAction => "requires_action",
            UnifiedPaymentStatus::RequiresPaymentMethod => "requires_payment_method",
            UnifiedPaymentStatus::Succeeded => "succeeded",
            UnifiedPaymentStatus::Failed => "failed",
            UnifiedPaymentStatus::Canceled => "canceled",
            UnifiedPaymentStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for UnifiedPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
