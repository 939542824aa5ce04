//! NOWPayments crypto provider.

mod http_client;
mod mock_client;
mod nowpayments_adapter;
mod order_id;
mod status;

pub use http_client::{
    NowPaymentsHttpClient, NowPaymentsHttpConfig, DEFAULT_CURRENCY_CACHE_TTL,
    DEFAULT_NOWPAYMENTS_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT,
};
pub use mock_client::MockNowPaymentsClient;
pub use nowpayments_adapter::{
    details_from_payment, NowPaymentsProvider, NowPaymentsProviderConfig, PAYMENT_EXPIRY_MINUTES,
};
pub use order_id::fallback_order_id;
pub use status::map_nowpayments_status;
