//! crates/pantry_planner_core/src/quantity.rs
//!
//! Lenient interpretation of the free-text quantities and names users type in.

/// What an unparseable pantry quantity contributes to availability.
pub const PANTRY_UNPARSEABLE_DEFAULT: f64 = 0.0;

/// What an unparseable recipe quantity is assumed to need.
pub const RECIPE_UNPARSEABLE_DEFAULT: f64 = 1.0;

/// Reads the leading decimal number of `raw`, ignoring leading whitespace and any
/// trailing text ("2 cups" is 2, "1.5kg" is 1.5).
///
/// Returns `None` when no finite number starts the string.
pub fn parse_quantity(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        // "5." is a number, a lone "." is not.
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|q| q.is_finite())
}

/// Quantity a pantry entry makes available.
pub fn available_quantity(raw: &str) -> f64 {
    parse_quantity(raw).unwrap_or(PANTRY_UNPARSEABLE_DEFAULT)
}

/// Quantity a recipe ingredient requires. A zero amount counts as one unit.
pub fn needed_quantity(raw: &str) -> f64 {
    parse_quantity(raw)
        .filter(|q| *q != 0.0)
        .unwrap_or(RECIPE_UNPARSEABLE_DEFAULT)
}

/// The matching key for an ingredient or pantry item name.
///
/// Only case is folded. Plurals and synonyms stay distinct ("tomato" and
/// "tomatoes" never merge).
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}
