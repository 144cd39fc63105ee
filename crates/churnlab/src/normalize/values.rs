//! Lenient coercion of raw cell values into canonical field types.
//!
//! Every function here is total: unrecognized input degrades to the type's
//! default instead of failing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::input::{is_missing, value_text};
use crate::schema::{ContractType, InternetServiceType, ServiceFlag};

/// Currency symbols, thousands separators and whitespace stripped before parsing.
static NUMBER_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,$€£¥\s]").unwrap());

const TRUE_WORDS: &[&str] = &["yes", "1", "true", "y", "si", "sí", "oui", "ja"];
const FALSE_WORDS: &[&str] = &["no", "0", "false", "n", "non", "nein"];

/// Parse a boolean, returning `None` when the value is missing or unrecognized.
pub fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 1.0 => Some(true),
            Some(x) if x == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => {
            let lowered = s.trim().to_lowercase();
            if TRUE_WORDS.contains(&lowered.as_str()) {
                Some(true)
            } else if FALSE_WORDS.contains(&lowered.as_str()) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Coerce to a boolean; anything unrecognized is `false`.
pub fn normalize_bool(value: Option<&Value>) -> bool {
    value.and_then(parse_bool).unwrap_or(false)
}

/// Parse a number as written, sign included. `None` when missing or not numeric.
pub fn parse_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned = NUMBER_NOISE.replace_all(s, "");
            if cleaned.is_empty() {
                None
            } else {
                cleaned.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|x| x.is_finite())
}

/// Coerce to a finite, non-negative number. Negative or unparseable input is 0.
pub fn normalize_number(value: Option<&Value>) -> f64 {
    match value.and_then(parse_number) {
        Some(x) if x > 0.0 => x,
        _ => 0.0,
    }
}

/// Coerce to a whole number of months, rounding down.
pub fn normalize_tenure(value: Option<&Value>) -> u32 {
    let months = normalize_number(value).floor();
    if months >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        months as u32
    }
}

/// Trimmed text; missing values become the empty string.
pub fn normalize_text(value: Option<&Value>) -> String {
    match value {
        Some(v) if !is_missing(v) => value_text(v).trim().to_string(),
        _ => String::new(),
    }
}

pub fn normalize_service_flag(value: Option<&Value>) -> ServiceFlag {
    match value {
        Some(Value::Bool(true)) => ServiceFlag::Yes,
        Some(v) if !is_missing(v) => ServiceFlag::parse(&value_text(v)),
        _ => ServiceFlag::default(),
    }
}

pub fn normalize_internet(value: Option<&Value>) -> InternetServiceType {
    match value {
        Some(Value::Bool(false)) => InternetServiceType::None,
        Some(v) if !is_missing(v) => InternetServiceType::parse(&value_text(v)),
        _ => InternetServiceType::default(),
    }
}

pub fn normalize_contract(value: Option<&Value>) -> ContractType {
    match value {
        Some(v) if !is_missing(v) => ContractType::parse(&value_text(v)),
        _ => ContractType::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bool_variants() {
        for v in [json!("Yes"), json!("Y"), json!("TRUE"), json!(1), json!("1"), json!(true)] {
            assert!(normalize_bool(Some(&v)), "{} should be true", v);
        }
        for v in [json!("No"), json!("n"), json!("false"), json!(0), json!("maybe"), json!(null)] {
            assert!(!normalize_bool(Some(&v)), "{} should be false", v);
        }
        assert!(!normalize_bool(None));
        assert_eq!(parse_bool(&json!("maybe")), None);
    }

    #[test]
    fn test_number_strips_currency() {
        assert_eq!(normalize_number(Some(&json!("$1,234.50"))), 1234.5);
        assert_eq!(normalize_number(Some(&json!("€ 29.85"))), 29.85);
        assert_eq!(normalize_number(Some(&json!(70.7))), 70.7);
        assert_eq!(normalize_number(Some(&json!("  "))), 0.0);
        assert_eq!(normalize_number(Some(&json!("abc"))), 0.0);
        assert_eq!(normalize_number(Some(&json!("NaN"))), 0.0);
        assert_eq!(normalize_number(Some(&json!("inf"))), 0.0);
    }

    #[test]
    fn test_negative_numbers_clamp_to_zero() {
        assert_eq!(parse_number(&json!("-5")), Some(-5.0));
        assert_eq!(normalize_number(Some(&json!("-5"))), 0.0);
        assert_eq!(normalize_tenure(Some(&json!(-3))), 0);
    }

    #[test]
    fn test_tenure_rounds_down() {
        assert_eq!(normalize_tenure(Some(&json!("12.9"))), 12);
        assert_eq!(normalize_tenure(Some(&json!(1e12))), u32::MAX);
    }

    #[test]
    fn test_enums() {
        assert_eq!(normalize_contract(Some(&json!("Two year"))), ContractType::TwoYear);
        assert_eq!(normalize_internet(Some(&json!("Fiber optic"))), InternetServiceType::FiberOptic);
        assert_eq!(normalize_internet(None), InternetServiceType::Unspecified);
        assert_eq!(normalize_service_flag(Some(&json!(true))), ServiceFlag::Yes);
        assert_eq!(normalize_text(Some(&json!("  Male "))), "Male");
        assert_eq!(normalize_text(Some(&json!("N/A"))), "");
    }
}
