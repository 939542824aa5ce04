//! Application layer - provider selection and dispatch.

mod payment_router;

pub use payment_router::{PaymentMethod, PaymentRouter};
