//! Major/minor currency unit conversion.
//!
//! Amounts cross the crate boundary in major units (`19.99`) and travel to
//! card networks in integer minor units (`1999`). Amounts that do not land on
//! a cent boundary are rounded, never rejected.

/// Minor units per major unit for every card currency we accept.
pub const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

/// Converts a major-unit amount to integer minor units, rounding half away from zero.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * MINOR_UNITS_PER_MAJOR).round() as i64
}

/// Converts integer minor units back to a major-unit amount.
pub fn from_minor_units(minor: i64) -> f64 {
    minor as f64 / MINOR_UNITS_PER_MAJOR
}
