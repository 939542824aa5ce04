//! Provider identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which payment network serviced a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Card payments via Stripe PaymentIntents.
    Stripe,

    /// Hosted crypto payments via NOWPayments.
    NowPayments,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Stripe => "stripe",
            ProviderKind::NowPayments => "nowpayments",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
