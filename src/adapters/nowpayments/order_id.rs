//! Fallback order ids for crypto payments created without one.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::foundation::{Timestamp, UserId};

/// Last millisecond stamp handed out by this process.
static LAST_ISSUED_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Returns `now_millis`, or one past the previously issued stamp if that is later.
///
/// Strictly increasing within a process, so two payments created in the same
/// millisecond never share an order id.
fn next_stamp(now_millis: i64) -> i64 {
    let mut last = LAST_ISSUED_MILLIS.load(Ordering::Relaxed);
    loop {
        let next = now_millis.max(last + 1);
        match LAST_ISSUED_MILLIS.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// Builds `credit-{user_id}-{millis}`.
pub fn fallback_order_id(user_id: &UserId, now: &Timestamp) -> String {
    format!("credit-{}-{}", user_id, next_stamp(now.as_unix_millis()))
}
