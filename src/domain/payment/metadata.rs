//! Free-form payment metadata.
//!
//! Callers attach arbitrary JSON values. Card networks only accept string
//! metadata, so values are coerced here and nowhere else.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Caller-supplied metadata attached to a payment.
pub type Metadata = HashMap<String, Value>;

/// Metadata key requesting that the payment method be saved for renewals.
pub const AUTO_RENEW_KEY: &str = "auto_renew";

/// Coerces one metadata value to a string.
///
/// Strings pass through unchanged; every other value is JSON-serialized
/// (`5` becomes `"5"`, `true` becomes `"true"`, objects keep their JSON form).
pub fn coerce_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerces all metadata values to strings.
///
/// Sorted by key so the encoded request is deterministic.
pub fn coerce_metadata(metadata: &Metadata) -> BTreeMap<String, String> {
    metadata
        .iter()
        .map(|(key, value)| (key.clone(), coerce_value(value)))
        .collect()
}

/// Interprets a loosely-typed flag.
///
/// Truthy: `true`, `"true"`, `1`, `"1"`. Everything else, including a
/// missing value, is falsy.
pub fn is_truthy_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s == "true" || s == "1",
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        _ => false,
    }
}

/// Returns true if the metadata asks for the payment method to be reused off-session.
pub fn wants_auto_renew(metadata: &Metadata) -> bool {
    is_truthy_flag(metadata.get(AUTO_RENEW_KEY))
}
